use std::io::Write as _;

use companion_client::{
    ChatClient, ChatMessage, ClientError, DEFAULT_MODEL, StreamRequest, init_observability,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    dotenvy::dotenv().ok();
    init_observability();

    let client = ChatClient::from_env()?;
    if client.credentials().token().is_none() {
        let email = std::env::var("COMPANION_EMAIL").map_err(|_| {
            ClientError::config("set COMPANION_API_TOKEN or COMPANION_EMAIL/COMPANION_PASSWORD")
        })?;
        let password = std::env::var("COMPANION_PASSWORD")
            .map_err(|_| ClientError::config("COMPANION_PASSWORD is not set"))?;
        let session = client.login(&email, &password).await?;
        println!("logged in as {}", session.user.name);
    }

    let persona_id = std::env::var("COMPANION_PERSONA_ID")
        .map_err(|_| ClientError::config("COMPANION_PERSONA_ID is not set"))?;
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Tell me about your day.".to_string());

    let request = StreamRequest::new(vec![ChatMessage::user(prompt)], DEFAULT_MODEL);
    client
        .stream_chat(
            &persona_id,
            &request,
            |delta| {
                print!("{delta}");
                let _ = std::io::stdout().flush();
            },
            |_done| println!(),
            |error| eprintln!("stream failed: {error}"),
        )
        .await;

    Ok(())
}
