//! Command line: infer a schema from samples, or resolve an existing one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};

use crate::inference::Infer;
use crate::raw::RawSchema;
use crate::{jq, path_de, resolve};

// ------------------------------- TYPES ------------------------------------ //

/// Infer a JSON-Schema-like description from sample JSON documents, or
/// resolve/validate an existing schema document.
#[derive(Parser, Debug)]
#[command(name = "json-mold", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer a schema from sample documents
    Schema(SchemaCmd),
    /// resolve and validate an existing schema document
    Resolve(ResolveCmd),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat each input line as one sample (newline-delimited JSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// jq filter applied to each document; every produced value is a sample
    #[arg(long)]
    jq: Option<String>,

    /// skip samples that fail to decode instead of aborting
    #[arg(long, default_value_t = false)]
    skip_invalid: bool,

    /// one or more literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct SchemaCmd {
    #[command(flatten)]
    input_settings: InputSettings,

    /// emit the resolved single-typed view instead of the raw tree
    #[arg(long, default_value_t = false)]
    resolved: bool,

    /// output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ResolveCmd {
    /// schema document to resolve (.json, .yaml or .yml)
    #[arg(long, short)]
    input: PathBuf,

    /// output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

// ---------------------------- IMPLEMENTATION ------------------------------ //

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Schema(cmd) => cmd.run(),
            Command::Resolve(cmd) => cmd.run(),
        }
    }
}

impl SchemaCmd {
    fn run(&self) -> Result<()> {
        let mut inf = Infer::new();
        self.input_settings.feed(&mut inf)?;

        let raw = inf.target().to_raw();
        let rendered = if self.resolved {
            let schema = resolve::resolve(&raw).context("resolve inferred schema")?;
            render(&schema, self.format)?
        } else {
            render(&raw, self.format)?
        };
        write_output(self.out.as_deref(), &rendered)
    }
}

impl ResolveCmd {
    fn run(&self) -> Result<()> {
        let source = std::fs::read_to_string(&self.input)
            .with_context(|| format!("read schema document {}", self.input.display()))?;
        let raw: RawSchema = if is_yaml_path(&self.input) {
            serde_yaml::from_str(&source).context("parse YAML schema document")?
        } else {
            path_de::from_str(&source).context("parse JSON schema document")?
        };
        let schema = resolve::resolve(&raw)
            .with_context(|| format!("resolve {}", self.input.display()))?;
        write_output(self.out.as_deref(), &render(&schema, self.format)?)
    }
}

impl InputSettings {
    fn feed(&self, inf: &mut Infer) -> Result<()> {
        let paths = resolve_input_patterns(&self.input)?;
        info!(inputs = paths.len(), "resolved input paths");
        for path in &paths {
            self.feed_file(inf, path)
                .with_context(|| format!("sample file {}", path.display()))?;
        }
        Ok(())
    }

    fn feed_file(&self, inf: &mut Infer, path: &Path) -> Result<()> {
        let source = std::fs::read_to_string(path).context("read")?;
        debug!(path = %path.display(), bytes = source.len(), "loaded input");
        if self.ndjson {
            for (line_no, line) in source.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                self.feed_sample(inf, line)
                    .with_context(|| format!("line {}", line_no + 1))?;
            }
            return Ok(());
        }
        self.feed_sample(inf, &source)
    }

    fn feed_sample(&self, inf: &mut Infer, sample: &str) -> Result<()> {
        let Some(filter) = &self.jq else {
            if let Err(err) = inf.apply(sample.as_bytes()) {
                if self.skip_invalid {
                    warn!(%err, "skipping undecodable sample");
                    return Ok(());
                }
                return Err(err.into());
            }
            return Ok(());
        };

        let document: serde_json::Value = match path_de::from_str(sample) {
            Ok(document) => document,
            Err(err) if self.skip_invalid => {
                warn!(%err, "skipping undecodable document");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        for produced in jq::apply_filter(filter, &document)? {
            inf.apply(produced.as_bytes())
                .context("apply jq-filtered sample")?;
        }
        Ok(())
    }
}

// --------------------------- INTERNAL HELPERS ----------------------------- //

fn render<T: serde::Serialize>(value: &T, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(value).context("render JSON")?,
        Format::Yaml => serde_yaml::to_string(value).context("render YAML")?,
    })
}

fn write_output(out: Option<&Path>, rendered: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            std::fs::write(path, rendered).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "schema written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

fn resolve_input_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();

        if !has_glob_chars(pattern) {
            // Literal path, taken as-is.
            out.push(PathBuf::from(pattern));
            continue;
        }

        let mut matched_any = false;
        for entry in
            glob::glob(pattern).with_context(|| format!("bad glob pattern `{pattern}`"))?
        {
            out.push(entry.with_context(|| format!("walk glob `{pattern}`"))?);
            matched_any = true;
        }
        if !matched_any {
            // An explicit glob that hits nothing is a user mistake.
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn settings(input: Vec<String>) -> InputSettings {
        InputSettings {
            ndjson: false,
            jq: None,
            skip_invalid: false,
            input,
        }
    }

    fn inferred(settings: &InputSettings) -> serde_json::Value {
        let mut inf = Infer::new();
        settings.feed(&mut inf).unwrap();
        serde_json::to_value(inf.target().to_raw()).unwrap()
    }

    #[test]
    fn literal_paths_pass_through_untouched() {
        let paths = resolve_input_patterns(["no/such/file.json"]).unwrap();
        assert_eq!(paths, [PathBuf::from("no/such/file.json")]);
    }

    #[test]
    fn globs_must_match_something() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.json");
        let pattern = pattern.to_string_lossy();
        assert!(resolve_input_patterns([pattern.as_ref()]).is_err());
    }

    #[test]
    fn glob_patterns_expand_to_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "1").unwrap();
        std::fs::write(dir.path().join("b.json"), "2").unwrap();
        std::fs::write(dir.path().join("c.txt"), "x").unwrap();

        let pattern = dir.path().join("*.json");
        let pattern = pattern.to_string_lossy();
        let paths = resolve_input_patterns([pattern.as_ref()]).unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn ndjson_feeds_one_sample_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.ndjson");
        std::fs::write(&path, "{\"a\": 1}\n\n{\"b\": 2.5}\n").unwrap();

        let mut settings = settings(vec![path.to_string_lossy().into_owned()]);
        settings.ndjson = true;
        assert_eq!(
            inferred(&settings),
            json!({
                "type": "object",
                "properties": {
                    "a": {"type": "integer"},
                    "b": {"type": "number"},
                },
            })
        );
    }

    #[test]
    fn jq_filter_expands_documents_into_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrapped.json");
        std::fs::write(&path, r#"{"rows": [1, 2.5]}"#).unwrap();

        let mut settings = settings(vec![path.to_string_lossy().into_owned()]);
        settings.jq = Some(".rows[]".to_owned());
        assert_eq!(inferred(&settings), json!({"type": "number"}));
    }

    #[test]
    fn skip_invalid_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.ndjson");
        std::fs::write(&path, "1\nnot json\n2\n").unwrap();

        let mut strict = settings(vec![path.to_string_lossy().into_owned()]);
        strict.ndjson = true;
        let mut inf = Infer::new();
        assert!(strict.feed(&mut inf).is_err());

        let mut lenient = strict.clone();
        lenient.skip_invalid = true;
        assert_eq!(inferred(&lenient), json!({"type": "integer"}));
    }

    #[test]
    fn yaml_paths_are_detected_by_extension() {
        assert!(is_yaml_path(Path::new("schema.yaml")));
        assert!(is_yaml_path(Path::new("schema.yml")));
        assert!(!is_yaml_path(Path::new("schema.json")));
    }
}
