//! Chat on stdin/stdout

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::agent::PlanningAgent;
use crate::session::{ConversationState, GREETING};

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "bye"];

fn is_exit(line: &str) -> bool {
    EXIT_WORDS.contains(&line.to_lowercase().as_str())
}

/// Run one conversation until an exit word or end of input
///
/// Returns the number of exchanges held.
pub async fn run<R, W>(agent: &PlanningAgent, input: R, mut output: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut state = ConversationState::new();
    let mut lines = input.lines();

    output
        .write_all(format!("TripMate: {GREETING}\n(type 'quit' to exit)\n").as_bytes())
        .await?;

    loop {
        output.write_all(b"\nYou: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            output.write_all(b"TripMate: Safe travels!\n").await?;
            break;
        }

        let outcome = agent.respond(&mut state, line).await;
        output
            .write_all(format!("\nTripMate: {}\n", outcome.reply).as_bytes())
            .await?;
    }

    output.flush().await?;
    info!(exchanges = state.len(), "terminal session ended");
    Ok(state.len())
}

/// Terminal chat bound to the process's stdin and stdout
pub async fn run_stdio(agent: &PlanningAgent) -> Result<usize> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run(agent, stdin, tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("quit", true)]
    #[case("EXIT", true)]
    #[case("Bye", true)]
    #[case("bye bye", false)]
    #[case("Paris", false)]
    fn test_exit_words(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_exit(line), expected);
    }
}
