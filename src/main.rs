// SPDX-License-Identifier: GPL-3.0-only

use ticktotp::{
    Scheduler, Update,
    clipboard::{ArboardSink, Clipboard},
    clock::SystemClock,
    config::{APP_ID, Config},
    telemetry,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const PROMPT: &str = "Enter your secret key";

enum Command<'a> {
    Quit,
    Copy,
    Secret(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            ":quit" | ":q" => Command::Quit,
            ":copy" | ":c" => Command::Copy,
            _ => Command::Secret(line),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), anywho::Error> {
    let (config, config_error) = match Config::load(APP_ID).await {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    telemetry::init(&config.log_filter);
    if let Some(err) = config_error {
        tracing::warn!("Using default config: {}", err);
    }

    let clipboard = config.clipboard.then(|| Clipboard::spawn(ArboardSink::new));
    let mut scheduler = Scheduler::new(SystemClock);
    let mut updates = scheduler.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", PROMPT);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::Copy => match (scheduler.current_code(), &clipboard) {
                        (Some(code), Some(clipboard)) => clipboard.copy(code),
                        (None, _) => tracing::info!("Nothing to copy"),
                        (Some(_), None) => tracing::info!("Clipboard disabled in config"),
                    },
                    Command::Secret(secret) => scheduler.set_secret(secret),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let update = updates.borrow_and_update().clone();
                println!("{}", view(&update));
            }
        }
    }

    scheduler.stop();
    if let Some(clipboard) = clipboard {
        clipboard.close();
    }

    Ok(())
}

fn view(update: &Update) -> String {
    match update {
        Update::Idle => PROMPT.to_string(),
        Update::Tick(tick) => format!("{} ({}s)", tick.code, tick.seconds_remaining),
        Update::InvalidSecret => String::from("Invalid secret key"),
    }
}
