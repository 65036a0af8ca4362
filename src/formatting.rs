use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bex_lib::output::{BexOutput, ErrorOutput, ExtractOutput, BEX_OUTPUT_VERSION};
use bex_lib::BexError;

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &BexOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    }
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: BexError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let payload = err.to_payload();
    let body = BexOutput::Error(ErrorOutput {
        version: BEX_OUTPUT_VERSION.to_string(),
        message: Some(payload.message.clone()),
        error: payload,
    });

    if let Err(write_err) = write_output(&body, format, output) {
        eprintln!("Failed to write error output: {}", write_err);
    }

    ExitCode::from(2)
}

fn write_json_output(
    body: &BexOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    emit(&content, output)
}

fn write_pretty_output(
    body: &BexOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = match body {
        BexOutput::Extract(extract) => render_extract(extract),
        BexOutput::Error(error) => {
            let mut text = format!("Error: {}", error.error.message);
            if let Some(remediation) = &error.error.remediation {
                let _ = write!(text, "\nHint: {}", remediation);
            }
            text
        }
    };
    emit(&content, output)
}

fn emit(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn render_extract(extract: &ExtractOutput) -> String {
    let profile = &extract.profile;
    let mut text = String::new();

    let _ = writeln!(text, "Brand profile for {}", extract.url);
    let _ = writeln!(text, "  Name:        {}", profile.name);
    let _ = writeln!(text, "  Primary:     {}", profile.primary_color);
    let _ = writeln!(text, "  Secondary:   {}", profile.secondary_color);
    let _ = writeln!(text, "  Accent:      {}", profile.accent_color);
    let _ = writeln!(text, "  Font:        {}", profile.font_family);
    if let Some(logo) = &profile.logo_url {
        let _ = writeln!(text, "  Logo:        {}", logo);
    }

    let personality = &profile.personality;
    let secondary: Vec<&str> = personality
        .secondary_traits
        .iter()
        .map(|t| t.as_str())
        .collect();
    let _ = writeln!(
        text,
        "  Personality: {} ({}), {} industry, {} design",
        personality.primary_trait.as_str(),
        if secondary.is_empty() {
            "-".to_string()
        } else {
            secondary.join(", ")
        },
        personality.industry.as_str(),
        personality.design_approach.as_str()
    );

    let confidence = &profile.confidence;
    let _ = writeln!(
        text,
        "  Confidence:  overall {:.2} (name {:.2}, colors {:.2}, typography {:.2}, logo {:.2}, personality {:.2})",
        confidence.overall,
        confidence.name,
        confidence.colors,
        confidence.typography,
        confidence.logo,
        confidence.personality
    );

    if !extract.attempts.is_empty() {
        let _ = writeln!(text, "  Provider attempts:");
        for attempt in &extract.attempts {
            let reason = attempt
                .error_reason
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            let _ = writeln!(
                text,
                "    {} #{}: {:?} in {}ms{}",
                attempt.provider,
                attempt.attempt_index,
                attempt.outcome,
                attempt.latency.as_millis(),
                reason
            );
        }
    }

    let _ = write!(text, "  Completed in {}ms", extract.elapsed_ms);
    text
}
