use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use lipi::voice::{
    AudioPlayback, CpalCapture, CpalMicrophone, PLAYBACK_SAMPLE_RATE, SpeechOutput, Speaker,
    ToneCue, error_tone_samples, rms,
};
use lipi::{
    CardController, CardPorts, CardState, Category, Config, ConsoleNotifier, GeminiVerifier,
    LearningItem, Notifier, Verdict,
};

/// Lipi - flashcard pronunciation practice
#[derive(Parser)]
#[command(name = "lipi", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List practice categories
    Categories,
    /// List the items in a category
    List {
        /// Category (e.g. "english-alphabet")
        category: Category,
    },
    /// Practice a category card by card
    Practice {
        /// Category (e.g. "bangla-vowels")
        category: Category,
        /// Item to start from
        #[arg(short, long, default_value = "0")]
        index: usize,
    },
    /// Speak text with the reference voice
    Say {
        /// Text to speak
        text: String,
        /// Language tag
        #[arg(short, long, default_value = "en-US")]
        lang: String,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Play the error tone
    TestSpeaker,
    /// List audio input devices
    Devices,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,lipi=info",
        1 => "info,lipi=debug",
        2 => "debug",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Categories => {
            for category in Category::ALL {
                println!(
                    "{:<18} {} ({} items)",
                    category.slug(),
                    category.title(),
                    category.items().len()
                );
            }
            Ok(())
        }
        Command::List { category } => {
            for (i, item) in category.items().iter().enumerate() {
                println!("{i:>3}  {}", describe(item));
            }
            Ok(())
        }
        Command::Practice { category, index } => practice(category, index).await,
        Command::Say { text, lang } => say(&text, &lang).await,
        Command::TestMic { duration } => test_mic(duration).await,
        Command::TestSpeaker => test_speaker().await,
        Command::Devices => {
            for device in CpalMicrophone::list_devices()? {
                let marker = if device.is_default { "*" } else { " " };
                println!("{marker} {}", device.name);
            }
            Ok(())
        }
    }
}

fn describe(item: &LearningItem) -> String {
    let mut line = item.character.to_string();
    if let Some(word) = item.word {
        line.push_str(&format!("  {word}"));
    }
    if let Some(pron) = item.english_pronunciation {
        line.push_str(&format!("  ({pron})"));
    }
    line
}

/// Interactive practice loop over one category
async fn practice(category: Category, start: usize) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let verifier =
        GeminiVerifier::from_config(&config.verifier, config.api_key, Arc::clone(&notifier))?;
    let ports = CardPorts {
        speech: Arc::new(Speaker::system(Arc::clone(&notifier), config.speech.rate)),
        microphone: Arc::new(CpalMicrophone::new()),
        verifier: Arc::new(verifier),
        cue: Arc::new(ToneCue),
        notifier,
    };

    let items = category.items();
    let mut index = category.item(start).map(|_| start)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{category}: {} cards", items.len());

    loop {
        let card = CardController::new(items[index], category, ports.clone(), config.card);
        println!("\n[{}/{}] {}", index + 1, items.len(), describe(card.item()));

        loop {
            println!("[l]isten  [r]ecord  [n]ext  [p]revious  [q]uit");
            let Some(line) = input.next_line().await? else {
                return Ok(());
            };

            match line.trim() {
                "" | "l" => {
                    if !card.play_reference() {
                        println!("busy, try again in a moment");
                    }
                }
                "r" => record_attempt(&card, &mut input).await?,
                "n" => {
                    index = (index + 1) % items.len();
                    break;
                }
                "p" => {
                    index = index.checked_sub(1).unwrap_or(items.len() - 1);
                    break;
                }
                "q" => return Ok(()),
                other => println!("unknown choice: {other}"),
            }
        }
    }
}

/// Record one attempt and print the verdict
async fn record_attempt(
    card: &CardController,
    input: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    if !card.begin_recording().await {
        return Ok(());
    }

    let expected = card.item().expected_text(card.category());
    println!("Recording... say \"{expected}\" and press Enter");
    input.next_line().await?;

    let mut states = card.subscribe();
    card.end_recording();

    loop {
        let state = *states.borrow_and_update();
        match state {
            CardState::Verifying => println!("checking..."),
            CardState::ShowingResult(Verdict::Correct) => {
                println!("✓ correct!");
                return Ok(());
            }
            CardState::ShowingResult(Verdict::Incorrect) => {
                println!("✗ not quite, listen and try again");
                return Ok(());
            }
            CardState::Idle => {
                println!("nothing was recorded");
                return Ok(());
            }
            CardState::Recording => {}
        }
        states.changed().await?;
    }
}

/// Speak text once
async fn say(text: &str, lang: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let speaker = Speaker::system(Arc::new(ConsoleNotifier), config.speech.rate);
    if !speaker.is_supported() {
        anyhow::bail!("no speech engine installed (install espeak-ng)");
    }
    speaker.speak(text, lang);

    // Give the engine a moment before the process exits
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(())
}

/// Test microphone input
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let capture = tokio::task::spawn_blocking(CpalCapture::start).await??;
    println!("Sample rate: {} Hz", capture.sample_rate());
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek_samples();
        let energy = rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);

        capture.clear_samples();
    }

    drop(capture);

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: lipi devices");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Play the error tone
async fn test_speaker() -> anyhow::Result<()> {
    println!("Playing the error tone (150 Hz, half a second)...");

    tokio::task::spawn_blocking(|| {
        AudioPlayback::new()?.play_blocking(error_tone_samples(PLAYBACK_SAMPLE_RATE))
    })
    .await??;

    println!("If you heard a low beep, your speakers are working!");
    Ok(())
}
