use std::env;
use std::fs;
use std::path::Path;
use std::process;
use std::time::Duration;

use chordcraft::playback::{export, write_midi, LoggingBackend, PlaybackOutcome, Sequencer};
use chordcraft::{Session, SessionConfig};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: chordcraft [--config <config.yaml>] <song.json> [--midi <out.mid>] [--play] [--from <index>]";

struct Args {
    config: Option<String>,
    song: String,
    midi: Option<String>,
    play: bool,
    from: isize,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut config = None;
    let mut song = None;
    let mut midi = None;
    let mut play = false;
    let mut from = 0;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config = Some(iter.next().ok_or("--config needs a file")?.clone()),
            "--midi" => midi = Some(iter.next().ok_or("--midi needs a file")?.clone()),
            "--play" => play = true,
            "--from" => {
                let value = iter.next().ok_or("--from needs an index")?;
                from = value.parse().map_err(|_| format!("invalid start index '{}'", value))?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            path => {
                if song.replace(path.to_string()).is_some() {
                    return Err("only one song file may be given".to_string());
                }
            }
        }
    }

    Ok(Args {
        config,
        song: song.ok_or("missing song file")?,
        midi,
        play,
        from,
    })
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let raw_args: Vec<String> = env::args().collect();
    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let config = match &args.config {
        Some(path) => SessionConfig::load(Path::new(path)).unwrap_or_else(|e| fail(e)),
        None => SessionConfig::default(),
    };

    let content = fs::read_to_string(&args.song)
        .unwrap_or_else(|e| fail(format!("reading '{}': {}", args.song, e)));
    let mut session = Session::new(&config);
    if let Err(e) = session.load_json(&content) {
        fail(e);
    }

    // Labels table
    for (i, rendered) in session.render().iter().enumerate() {
        match rendered {
            Ok(r) => {
                let motion = r.labels.motion.map(|m| m.to_string()).unwrap_or_default();
                println!(
                    "{:>3}  {:<3} {}:{:<8} {:<6} {:<4} {:<4} {:<22} {:<12} {}",
                    i + 1,
                    r.key_label,
                    r.resolved.bass,
                    r.resolved.shape.as_str(),
                    r.labels.main_function,
                    r.labels.scale_level,
                    motion,
                    r.labels.spelling,
                    r.labels.accidentals,
                    r.pitch_names.join(" "),
                );
            }
            Err(e) => println!("{:>3}  {}", i + 1, e),
        }
    }

    let resolved = session.resolved();

    if let Some(path) = &args.midi {
        let bytes = export(&resolved)
            .and_then(|data| write_midi(&data, config.velocity))
            .unwrap_or_else(|e| fail(e));
        if let Err(e) = fs::write(path, &bytes) {
            fail(format!("writing '{}': {}", path, e));
        }
        eprintln!("Wrote MIDI to {}", path);
    }

    if args.play {
        let sequencer = Sequencer::connect(&LoggingBackend, config.release_tail)
            .await
            .unwrap_or_else(|e| fail(e));
        let task = {
            let sequencer = sequencer.clone();
            let from = args.from;
            tokio::spawn(async move { sequencer.play(&resolved, from).await })
        };

        let mut ticker = tokio::time::interval(Duration::from_millis(50));
        while !task.is_finished() {
            ticker.tick().await;
            if session.sync_now_playing(sequencer.control()) {
                if let Some(index) = session.now_playing() {
                    eprintln!("Playing chord {}", index + 1);
                }
            }
        }

        match task.await {
            Ok(Ok(PlaybackOutcome::Completed)) => eprintln!("Playback complete"),
            Ok(Ok(PlaybackOutcome::Stopped { at })) => eprintln!("Playback stopped before chord {}", at + 1),
            Ok(Err(e)) => fail(e),
            Err(e) => fail(e),
        }
    }
}
