use super::ClientContext;
use super::auth::status;
use super::render::{self, OutputFormat};
use crate::error::Result;
use crate::models::DriveFile;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

const HELP: &str = "\
Commands:
  list                 list spreadsheets (cached for 5 minutes)
  refresh              list spreadsheets, skipping the cache
  open <n|id> [range]  print sheet values
  tabs <n|id>          print the spreadsheet's tabs
  login | logout       sign in or out of Google
  status               show the sign-in state
  quit";

#[derive(Debug, PartialEq)]
enum BrowseCommand {
    List { refresh: bool },
    Open { target: String, range: Option<String> },
    Tabs { target: String },
    Login,
    Logout,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse(line: &str) -> BrowseCommand {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return BrowseCommand::Empty;
    };
    let target = words.next().map(str::to_string);
    let rest = words.next().map(str::to_string);

    match (command, target) {
        ("list" | "ls", _) => BrowseCommand::List { refresh: false },
        ("refresh", _) => BrowseCommand::List { refresh: true },
        ("open", Some(target)) => BrowseCommand::Open {
            target,
            range: rest,
        },
        ("tabs", Some(target)) => BrowseCommand::Tabs { target },
        ("login", _) => BrowseCommand::Login,
        ("logout", _) => BrowseCommand::Logout,
        ("status", _) => BrowseCommand::Status,
        ("help" | "?", _) => BrowseCommand::Help,
        ("quit" | "exit" | "q", _) => BrowseCommand::Quit,
        _ => BrowseCommand::Unknown(line.trim().to_string()),
    }
}

/// A 1-based position in the last listing, or a literal file id
fn resolve<'a>(target: &'a str, listed: &'a [DriveFile]) -> &'a str {
    target
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| listed.get(i))
        .map(|f| f.id.as_str())
        .unwrap_or(target)
}

pub(super) async fn run(ctx: &mut ClientContext) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut listed: Vec<DriveFile> = Vec::new();

    println!("{}", HELP);
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        let command = parse(&line);
        if command == BrowseCommand::Quit {
            return Ok(());
        }

        // Errors end the command, not the session
        if let Err(e) = execute(ctx, command, &mut listed).await {
            error!("Error: {}", e);
        }
    }
}

async fn execute(
    ctx: &mut ClientContext,
    command: BrowseCommand,
    listed: &mut Vec<DriveFile>,
) -> Result<()> {
    match command {
        BrowseCommand::List { refresh } => {
            *listed = ctx
                .service
                .list_spreadsheets(ctx.session.state(), !refresh)
                .await?;
            render::spreadsheets(&mut io::stdout().lock(), listed)
        }
        BrowseCommand::Open { target, range } => {
            let data = ctx
                .service
                .get_sheet_data(ctx.session.state(), resolve(&target, listed), range.as_deref())
                .await?;
            let mut out = io::stdout().lock();
            writeln!(out, "{}", data.range)?;
            render::sheet_data(&mut out, &data, OutputFormat::Table)
        }
        BrowseCommand::Tabs { target } => {
            let metadata = ctx
                .service
                .get_sheet_metadata(ctx.session.state(), resolve(&target, listed))
                .await?;
            render::metadata(&mut io::stdout().lock(), &metadata)
        }
        BrowseCommand::Login => ctx.session.sign_in().await,
        BrowseCommand::Logout => {
            ctx.sign_out().await;
            listed.clear();
            Ok(())
        }
        BrowseCommand::Status => {
            status(ctx);
            Ok(())
        }
        BrowseCommand::Help => {
            println!("{}", HELP);
            Ok(())
        }
        BrowseCommand::Unknown(line) => {
            println!("Unknown command: {} (try 'help')", line);
            Ok(())
        }
        BrowseCommand::Quit | BrowseCommand::Empty => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::drive_file::test_helpers::mock_drive_file;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("list"), BrowseCommand::List { refresh: false });
        assert_eq!(parse("  refresh "), BrowseCommand::List { refresh: true });
        assert_eq!(
            parse("open 2 Summary!A1:C5"),
            BrowseCommand::Open {
                target: "2".to_string(),
                range: Some("Summary!A1:C5".to_string()),
            }
        );
        assert_eq!(
            parse("tabs abc"),
            BrowseCommand::Tabs {
                target: "abc".to_string()
            }
        );
        assert_eq!(parse(""), BrowseCommand::Empty);
        assert_eq!(parse("q"), BrowseCommand::Quit);
        assert_eq!(parse("open"), BrowseCommand::Unknown("open".to_string()));
    }

    #[test]
    fn test_resolve_targets() {
        let listed = vec![mock_drive_file("first", 2), mock_drive_file("second", 1)];

        assert_eq!(resolve("1", &listed), "first");
        assert_eq!(resolve("2", &listed), "second");
        assert_eq!(resolve("3", &listed), "3");
        assert_eq!(resolve("0", &listed), "0");
        assert_eq!(resolve("1AbCdEf", &listed), "1AbCdEf");
    }
}
