use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(app: super::App) -> Result<()> {
    let prefix = app.dispatcher.prefix().to_string();
    println!("\x1b[1mstudy-bot\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Channel: \x1b[36m{}\x1b[0m  User: \x1b[36m{}\x1b[0m",
        app.context.channel_id, app.context.user_id
    );
    println!("Type \x1b[33m{prefix}help\x1b[0m for commands, \x1b[33m/exit\x1b[0m or Ctrl-D to quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        eprint!("\x1b[32;1mstudy>\x1b[0m ");
        std::io::stderr().flush().ok();

        let input = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                // EOF (Ctrl-D)
                println!("\nGoodbye!");
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/exit" | "/quit" | "/q" => {
                println!("Goodbye!");
                break;
            }
            "/whoami" => {
                println!(
                    "user {} in channel {} (owner {}, admin: {})",
                    app.context.user_id,
                    app.context.channel_id,
                    app.context.owner,
                    app.context.permissions.administrator
                );
                continue;
            }
            _ => {}
        }

        match app.dispatcher.dispatch(&app.context, input).await {
            Some(reply) => println!("{}", reply.plain_text()),
            None => println!("\x1b[90mCommands start with '{prefix}'. Try {prefix}help.\x1b[0m"),
        }
    }

    Ok(())
}
