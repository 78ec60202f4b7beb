//! The console task: read a line, dispatch it, print the result.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};

use super::output::ConsoleWriter;
use super::registry::CommandRegistry;
use crate::error::{RadiowireError, Result};

/// Serve console lines until the input reaches EOF.
///
/// Command errors are printed as `error: ...` and never end the session;
/// only I/O errors on the console streams do.
pub async fn run_console<R, W>(
    reader: R,
    writer: &mut ConsoleWriter<W>,
    registry: &CommandRegistry,
    prompt: &str,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tracing::debug!("Console started");

    let mut lines = reader.lines();
    writer.prompt(prompt).await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() {
            match registry.dispatch(line).await {
                Ok(output) => writer.write_block(&output).await?,
                Err(RadiowireError::Io(e)) => return Err(RadiowireError::Io(e)),
                Err(e) => {
                    tracing::debug!("Command '{}' failed: {}", line, e);
                    writer.write_line(&format!("error: {}", e)).await?;
                }
            }
        }
        writer.prompt(prompt).await?;
    }

    tracing::debug!("Console input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::registry::{BoxFuture, Command, CommandResult};

    struct Upper;

    impl Command for Upper {
        fn summary(&self) -> &str {
            "upper:\tUppercase the arguments."
        }

        fn execute<'a>(&'a self, args: &'a [&'a str]) -> BoxFuture<'a, CommandResult> {
            Box::pin(async move {
                if args.is_empty() {
                    return Err(RadiowireError::usage("nothing to uppercase"));
                }
                Ok(args.join(" ").to_uppercase())
            })
        }
    }

    async fn session(input: &str) -> String {
        let mut registry = CommandRegistry::new();
        registry.register("upper", Upper);

        let mut writer = ConsoleWriter::new(Vec::new());
        run_console(input.as_bytes(), &mut writer, &registry, "> ")
            .await
            .unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn test_session_runs_commands() {
        let out = session("upper abc\r\n").await;
        assert_eq!(out, "> ABC\r\n> ");
    }

    #[tokio::test]
    async fn test_session_reports_errors_and_continues() {
        let out = session("upper\nupper ok\n").await;
        assert_eq!(out, "> error: nothing to uppercase\r\n> OK\r\n> ");
    }

    #[tokio::test]
    async fn test_session_skips_blank_lines() {
        let out = session("\n   \n").await;
        assert_eq!(out, "> > > ");
    }

    #[tokio::test]
    async fn test_session_unknown_command() {
        let out = session("nope\n").await;
        assert!(out.starts_with("> error: command 'nope' not recognised"));
    }
}
