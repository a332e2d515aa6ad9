use std::path::{Path, PathBuf};

use clap::Parser;
use common::{
    error::AppError,
    types::{
        exportable::ExportableQuestion,
        generation::GenerationParams,
        question::{Difficulty, QuestionType},
    },
    utils::config::{get_config, AppConfig},
};
use document_parsing::ParserRegistry;
use question_generation::{GenerationContext, StrategyFactory};
use quiz_export::QuizExporter;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Generate a Moodle XML quiz from a document.
#[derive(Parser, Debug)]
#[command(name = "quizgen", version)]
struct Args {
    /// Source document (pdf, docx, pptx, txt or md)
    input: PathBuf,

    /// Generation provider; falls back to the configured `llm_provider`
    #[arg(long, env = "QUIZGEN_PROVIDER")]
    provider: Option<String>,

    #[arg(long)]
    num_questions: Option<usize>,

    /// easy, medium or hard
    #[arg(long)]
    difficulty: Option<String>,

    /// Question type tag; repeat to request several
    #[arg(long = "type", value_name = "TYPE")]
    question_types: Vec<String>,

    #[arg(long)]
    language: Option<String>,

    #[arg(long, default_value = "Generated quiz")]
    title: String,

    /// Write the XML here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let args = Args::parse();
    let config = get_config()?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            interrupt.cancel();
        }
    });

    let file_type = file_type_of(&args.input)?;
    let registry = ParserRegistry::with_default_parsers();
    let mut file = tokio::fs::File::open(&args.input).await?;
    let text = registry.parse(&file_type, &mut file, &cancel).await?;
    info!(file_type = %file_type, chars = text.chars().count(), "Extracted document text");

    let params = generation_params(&args, &config, text)?;
    let provider = args.provider.as_deref().unwrap_or(&config.llm_provider);
    let strategy = StrategyFactory::new(config.clone()).create_strategy(provider)?;
    let context = GenerationContext::new(strategy);

    let generated = context.generate_questions(&cancel, &params).await?;
    info!(
        provider = context.provider_name(),
        questions = generated.len(),
        "Questions generated"
    );

    let (questions, answers) = ExportableQuestion::collect_generated(&generated);
    let xml = QuizExporter::new().export(&args.title, &questions, &answers)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, xml).await?;
            info!(path = %path.display(), "Quiz written");
        }
        None => println!("{xml}"),
    }

    Ok(())
}

/// Lower-cased file extension, used as the parser tag.
fn file_type_of(path: &Path) -> Result<String, AppError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| AppError::UnsupportedFileType(path.display().to_string()))
}

fn generation_params(
    args: &Args,
    config: &AppConfig,
    text: String,
) -> Result<GenerationParams, AppError> {
    let mut params = GenerationParams::new(
        text,
        args.num_questions.unwrap_or(config.generation_num_questions),
    );
    params.difficulty = args
        .difficulty
        .as_deref()
        .map(str::parse::<Difficulty>)
        .transpose()?;
    params.question_types = args
        .question_types
        .iter()
        .map(|tag| tag.parse::<QuestionType>())
        .collect::<Result<_, _>>()?;
    params.language = args
        .language
        .clone()
        .or_else(|| config.generation_language.clone());
    params.validate()?;
    Ok(params)
}
