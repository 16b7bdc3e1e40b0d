use crate::conversation::{ ConversationController, SendOutcome };
use crate::models::chat::{ Role, Turn };
use log::info;
use std::error::Error;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };

const PROMPT: &str = "> ";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Message(String),
    Reset,
    Clear,
    Quit,
    Empty,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" => Input::Empty,
        "/reset" => Input::Reset,
        "/clear" => Input::Clear,
        "/quit" | "/exit" => Input::Quit,
        text => Input::Message(text.to_string()),
    }
}

fn render(turn: &Turn) -> String {
    let speaker = match turn.role {
        Role::User => "you",
        Role::Model => "gpt",
    };
    format!("{}: {}", speaker, turn.text())
}

/// Terminal front end for a controller: one line of input per user turn.
pub async fn run_console(controller: &ConversationController) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Load failures are already logged; the session starts empty.
    let _ = controller.load().await;
    for turn in controller.messages() {
        stdout.write_all(format!("{}\n", render(&turn)).as_bytes()).await?;
    }
    stdout.write_all(b"(/reset, /clear, /quit)\n").await?;

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Quit => {
                break;
            }
            Input::Reset => {
                controller.reset().await;
                for turn in controller.messages() {
                    stdout.write_all(format!("{}\n", render(&turn)).as_bytes()).await?;
                }
            }
            Input::Clear => {
                if controller.clear().await.is_ok() {
                    for turn in controller.messages() {
                        stdout.write_all(format!("{}\n", render(&turn)).as_bytes()).await?;
                    }
                }
            }
            Input::Message(text) => {
                match controller.send(Turn::user(text)).await {
                    SendOutcome::Replied(reply) => {
                        stdout.write_all(format!("{}\n", render(&reply)).as_bytes()).await?;
                    }
                    SendOutcome::Failed(_) => {
                        stdout.write_all(b"(no reply, see log)\n").await?;
                    }
                    SendOutcome::Dropped => {}
                }
            }
        }
    }

    info!("Console session closed");
    Ok(())
}
