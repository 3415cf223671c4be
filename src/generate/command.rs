//! Local command backend.
//!
//! Writes the prompt to the command's stdin and treats stdout as the
//! generated text. Any tool that reads a prompt and prints a reply works
//! (`llm`, `ollama run <model>`, a wrapper script).
use super::{build_prompt, GenerationRequest, Generator};
use crate::util::truncate_string;
use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

const STDERR_PREVIEW_BYTES: usize = 200;

#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandGenerator {
    /// Parse `command` with shell quoting rules and resolve the program on PATH.
    pub fn new(command: &str) -> Result<Self> {
        let mut argv =
            shell_words::split(command).with_context(|| format!("parse LM command: {command}"))?;
        if argv.is_empty() {
            return Err(anyhow!("LM command is empty"));
        }
        let program = argv.remove(0);
        let resolved =
            which::which(&program).with_context(|| format!("resolve LM command {program}"))?;
        Ok(Self {
            program: resolved,
            args: argv,
        })
    }
}

impl Generator for CommandGenerator {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String> {
        let prompt = build_prompt(request);
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn LM command: {}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .context("write prompt to LM stdin")?;
        }

        let output = child.wait_with_output().context("wait for LM command")?;
        tracing::debug!(
            word = %request.word,
            pass = %request.pass,
            elapsed_ms = start.elapsed().as_millis() as u64,
            prompt_bytes = prompt.len(),
            response_bytes = output.stdout.len(),
            "lm command complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "LM command failed with status {}: {}",
                output.status,
                truncate_string(stderr.trim(), STDERR_PREVIEW_BYTES)
            ));
        }

        let text = String::from_utf8(output.stdout).context("decode LM stdout as UTF-8")?;
        Ok(text.trim().to_string())
    }
}
