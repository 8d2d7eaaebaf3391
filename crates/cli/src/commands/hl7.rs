use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use meridian_hl7v2::{
    AckCode, AckOptions, MergeStrategy, Message, ParseOptions, compare, generate_ack, merge,
    merge_by_segment_type, parse_with, to_er7,
};

use super::read_input;

/// Parser flags shared by the HL7 commands.
#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Skip text before MSH and drop malformed segments instead of failing
    #[arg(long)]
    lenient: bool,
}

impl ParseArgs {
    fn load(&self, path: &Path) -> anyhow::Result<Message> {
        let text = read_input(path)?;
        let options = ParseOptions {
            lenient: self.lenient,
        };
        parse_with(&text, &options).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[derive(Debug, Args)]
pub struct AckCommand {
    /// Message to acknowledge; `-` for stdin
    input: PathBuf,

    /// Acknowledgment code: AA, AE or AR
    #[arg(long, default_value = "AA")]
    code: AckCode,

    /// Free text for MSA-3
    #[arg(long)]
    text: Option<String>,

    /// Sending application of the acknowledgment (MSH-3)
    #[arg(long)]
    app: Option<String>,

    /// Sending facility of the acknowledgment (MSH-4)
    #[arg(long)]
    facility: Option<String>,

    #[command(flatten)]
    parse: ParseArgs,
}

impl AckCommand {
    pub fn execute(self) -> anyhow::Result<ExitCode> {
        let message = self.parse.load(&self.input)?;
        let options = AckOptions {
            text: self.text,
            application: self.app,
            facility: self.facility,
        };
        let ack = generate_ack(&message, self.code, &options)?;
        print_message(&ack)?;
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Args)]
pub struct DiffCommand {
    first: PathBuf,
    second: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    parse: ParseArgs,
}

impl DiffCommand {
    pub fn execute(self) -> anyhow::Result<ExitCode> {
        Ok(if self.run()? {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    /// Prints the report; returns whether the messages are identical.
    fn run(&self) -> anyhow::Result<bool> {
        let first = self.parse.load(&self.first)?;
        let second = self.parse.load(&self.second)?;
        let diff = compare(&first, &second);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&diff)?);
        } else {
            print!("{diff}");
        }
        Ok(diff.identical())
    }
}

#[derive(Debug, Args)]
pub struct MergeCommand {
    /// Messages to merge, in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// append, unique or replace
    #[arg(long, default_value = "append", conflicts_with = "segments")]
    strategy: MergeStrategy,

    /// Keep only these segment types (comma separated), appending in order
    #[arg(long, value_delimiter = ',')]
    segments: Option<Vec<String>>,

    /// Restamp MSH-7 of the merged message with the current time
    #[arg(long)]
    restamp: bool,

    #[command(flatten)]
    parse: ParseArgs,
}

impl MergeCommand {
    pub fn execute(self) -> anyhow::Result<ExitCode> {
        let messages = self
            .inputs
            .iter()
            .map(|path| self.parse.load(path))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let merged = match &self.segments {
            Some(types) => {
                let types: Vec<&str> = types.iter().map(|t| t.trim()).collect();
                merge_by_segment_type(&messages, Some(types.as_slice()))?
            }
            None => merge(&messages, self.strategy, !self.restamp)?,
        };
        print_message(&merged)?;
        Ok(ExitCode::SUCCESS)
    }
}

/// Prints ER7 with one segment per line.
fn print_message(message: &Message) -> anyhow::Result<()> {
    let text = to_er7(message)?;
    print!("{}", text.replace('\r', "\n"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("meridian-cli-{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_reports_path() {
        let path = write_temp("bad.hl7", "PID|1");
        let err = ParseArgs { lenient: false }.load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad.hl7"), "{err:#}");

        let message = ParseArgs { lenient: false }
            .load(&write_temp("good.hl7", "MSH|^~\\&|A\nPID|1\n"))
            .unwrap();
        assert_eq!(message.segments().len(), 2);
    }

    #[test]
    fn test_diff_reports_identity() {
        let a = write_temp("a.hl7", "MSH|^~\\&|A\rPID|1|x");
        let b = write_temp("b.hl7", "MSH|^~\\&|A\rPID|1|y");
        let same = DiffCommand {
            first: a.clone(),
            second: a.clone(),
            json: true,
            parse: ParseArgs { lenient: false },
        };
        assert!(same.run().unwrap());

        let different = DiffCommand {
            first: a,
            second: b,
            json: false,
            parse: ParseArgs { lenient: false },
        };
        assert!(!different.run().unwrap());
    }
}
