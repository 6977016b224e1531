use std::io::{BufRead as _, Write as _};

use companion_client::{
    ChatClient, ChatMessage, ChatSettings, ClientError, StreamFrame, StreamRequest,
    init_observability,
};
use futures::StreamExt as _;

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
        client.login(&email, &password).await?;
    }

    let persona_id = std::env::var("COMPANION_PERSONA_ID")
        .map_err(|_| ClientError::config("COMPANION_PERSONA_ID is not set"))?;

    let settings = ChatSettings::default();
    let mut history = client.history(&persona_id, Default::default()).await?;
    println!(
        "{} earlier messages; type a message, empty line quits",
        history.len()
    );

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            break;
        }

        history.push(ChatMessage::user(text));
        let request = StreamRequest::new(history.clone(), settings.model.clone());
        let mut stream = client.open_stream(&persona_id, &request).await?;

        let mut reply = String::new();
        while let Some(frame) = stream.next().await {
            match frame {
                StreamFrame::Delta { text } => {
                    reply.push_str(&text);
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
                StreamFrame::Done { .. } => println!(),
                StreamFrame::Error { message } => eprintln!("\nstream failed: {message}"),
            }
        }
        history.push(ChatMessage::assistant(reply));
    }

    Ok(())
}
