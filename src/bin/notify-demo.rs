// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use fdo_notify::{CloseReason, Config, Notification, Notifier, Timeout, Urgency};
use tokio::sync::mpsc;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UrgencyArg {
    Low,
    Normal,
    Critical,
}

impl From<UrgencyArg> for Urgency {
    fn from(urgency: UrgencyArg) -> Self {
        match urgency {
            UrgencyArg::Low => Urgency::Low,
            UrgencyArg::Normal => Urgency::Normal,
            UrgencyArg::Critical => Urgency::Critical,
        }
    }
}

/// Sends a desktop notification and reports what the user does with it.
#[derive(Debug, Parser)]
#[command(name = "notify-demo", version)]
struct Args {
    summary: String,

    #[arg(default_value = "")]
    body: String,

    #[arg(long, default_value = "notify-demo")]
    app_name: String,

    #[arg(short, long, default_value = "")]
    icon: String,

    #[arg(short, long, value_enum, default_value = "normal")]
    urgency: UrgencyArg,

    /// Milliseconds until the notification expires; 0 never expires. Server default if unset.
    #[arg(short = 't', long)]
    expire_time: Option<u64>,

    /// Action button as KEY=LABEL, may be repeated.
    #[arg(short = 'A', long = "action")]
    actions: Vec<String>,

    /// Print server information and capabilities first.
    #[arg(long)]
    info: bool,
}

enum Outcome {
    Action(String),
    Closed(u32),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut notifier = Notifier::connect(Config::new(&args.app_name))
        .await
        .context("failed to set up notifications")?;

    if args.info {
        let info = notifier.get_server_information().await?;
        println!(
            "{} {} ({}), spec {}",
            info.name, info.version, info.vendor, info.spec_version
        );
        println!("capabilities: {}", notifier.get_capabilities().await?.join(", "));
    }

    let notification = Notification::new(&args.summary, &args.body);
    notification.set_icon(&args.icon);
    notification.set_urgency(args.urgency.into());
    notification.set_timeout(match args.expire_time {
        None => Timeout::Default,
        Some(0) => Timeout::Never,
        Some(ms) => Timeout::After(Duration::from_millis(ms)),
    });

    let (tx, mut rx) = mpsc::unbounded_channel();

    for action in &args.actions {
        let (key, label) = match action.split_once('=') {
            Some(pair) => pair,
            None => bail!("action must be KEY=LABEL: {}", action),
        };
        let tx = tx.clone();
        let key_owned = key.to_string();
        notification.add_action(key, label, move || {
            let _ = tx.send(Outcome::Action(key_owned.clone()));
        });
    }

    notification.set_closed_handler(move |reason| {
        let _ = tx.send(Outcome::Closed(reason));
    });

    let id = notifier.notify(&notification).await?;
    println!("sent notification {}", id);

    while let Some(outcome) = rx.recv().await {
        match outcome {
            Outcome::Action(key) => {
                println!("action invoked: {}", key);
                notifier.close_notification(&notification).await?;
            }
            Outcome::Closed(reason) => {
                match CloseReason::from_code(reason) {
                    Some(reason) => println!("closed: {:?}", reason),
                    None => println!("closed: reason {}", reason),
                }
                break;
            }
        }
    }

    notifier.shutdown().await;

    Ok(())
}
