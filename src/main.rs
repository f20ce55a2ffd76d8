use clap::{Parser, Subcommand};
use shuangpin_tutor::{
    sequencer::{IdentityShuffler, Shuffler},
    util::percent,
    CombinationIndex, Curriculum, Dictionary, FileStateStore, KeyAlphabet, RandomShuffler,
    SchemeRegistry, StateStore, TutorSession, TypingPerformanceTracker, Validation,
};
use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};
use tracing_subscriber::EnvFilter;

/// progressive shuangpin drills with rolling speed and accuracy
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Learn a two-key shuangpin layout one key at a time. Lessons unlock keys in a fixed order, drills track rolling accuracy and speed, and per-key proficiency is kept between runs."
)]
pub struct Cli {
    /// state file to use instead of the per-user default
    #[clap(long, global = true)]
    state: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// show the unlocked keys and practice sequence of a lesson
    Lesson {
        /// lesson index, defaults to the saved one
        #[clap(short, long)]
        index: Option<i64>,

        /// seed for a reproducible shuffle
        #[clap(long)]
        seed: Option<u64>,
    },
    /// type the two-key code of each target character, one attempt per line
    Drill {
        /// lesson index, defaults to the saved one
        #[clap(short, long)]
        index: Option<i64>,

        /// number of attempts before the drill ends
        #[clap(short, long, default_value_t = 20)]
        count: usize,

        /// scheme to drill with, saved as the new default
        #[clap(short, long)]
        scheme: Option<String>,

        /// seed for a reproducible shuffle
        #[clap(long)]
        seed: Option<u64>,
    },
    /// show the weakest keys and combinations plus earned achievements
    Stats {
        /// how many weak entries to list
        #[clap(short, long, default_value_t = 10)]
        weakest: usize,
    },
    /// list preset and saved schemes
    Schemes,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = match &cli.state {
        Some(path) => FileStateStore::with_path(path),
        None => FileStateStore::new(),
    };
    tracing::debug!(path = %store.path().display(), "using state file");

    match cli.command {
        Command::Lesson { index, seed } => {
            let mut session = open_session(&store, seed)?;
            if let Some(index) = index {
                session.set_lesson(index);
            }
            print_lesson(&session);
        }
        Command::Drill {
            index,
            count,
            scheme,
            seed,
        } => {
            let mut session = open_session(&store, seed)?;
            if let Some(name) = scheme {
                session.set_scheme(&name);
            }
            if let Some(index) = index {
                session.set_lesson(index);
            }
            drill(&mut session, count)?;
            store.save(&session.snapshot())?;
        }
        Command::Stats { weakest } => {
            let session = open_session(&store, None)?;
            print_stats(&session, weakest);
        }
        Command::Schemes => {
            let session = open_session(&store, None)?;
            let active = &session.scheme().name;
            for name in session.schemes().modes() {
                let marker = if &name == active { "*" } else { " " };
                println!("{marker} {name}");
            }
        }
    }

    Ok(())
}

fn shuffler(seed: Option<u64>) -> Box<dyn Shuffler> {
    match seed {
        Some(seed) => Box::new(RandomShuffler::seeded(seed)),
        None => Box::new(RandomShuffler::from_entropy()),
    }
}

fn open_session(store: &FileStateStore, seed: Option<u64>) -> Result<TutorSession, Box<dyn Error>> {
    let state = store.try_load()?;
    let index = Arc::new(CombinationIndex::new(
        KeyAlphabet::standard(),
        Dictionary::embedded()?,
    ));
    let schemes = SchemeRegistry::new(Arc::clone(&index), state.local_schemes.clone())?;
    let mut session = TutorSession::new(
        index,
        Arc::new(Curriculum::standard()),
        schemes,
        Box::new(IdentityShuffler),
        TypingPerformanceTracker::new(),
    );
    session.restore(state, shuffler(seed));
    Ok(session)
}

fn print_lesson(session: &TutorSession) {
    let state = session.unlock_state();
    let sequence = session.sequence();
    println!("lesson     {}", session.lesson());
    println!(
        "newest key {}",
        state.latest_key.as_deref().unwrap_or("-")
    );
    println!("unlocked   {}", state.active_keys.join(" "));
    println!("preview    {}", sequence.preview().iter().collect::<String>());
    println!("practice   {}", sequence.tail().iter().collect::<String>());
}

fn drill(session: &mut TutorSession, count: usize) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    for _ in 0..count {
        let Some(target) = session.current_target() else {
            println!("lesson {} has nothing to practise", session.lesson());
            break;
        };
        let hint = session.hint().unwrap_or_default();
        let mut prompt = target.to_string();
        if session.settings().enable_pinyin_hint {
            let mut buf = [0u8; 4];
            let spellings = session.index().pinyin_of(target.encode_utf8(&mut buf));
            prompt.push_str(&format!(" [{}]", spellings.join("/")));
        }
        if session.settings().enable_key_hint {
            prompt.push_str(&format!(" ({hint})"));
        }
        write!(stdout, "{prompt} > ")?;
        stdout.flush()?;

        let Some(line) = lines.next().transpose()? else {
            println!();
            break;
        };
        let mut outcomes: Vec<Validation> = line
            .chars()
            .filter(|c| !c.is_whitespace())
            .filter_map(|k| session.press_key(k))
            .collect();
        outcomes.extend(session.validate());

        for outcome in &outcomes {
            report(session, outcome, &hint);
        }
    }

    let tracker = session.tracker();
    println!(
        "total {}/{} correct, {} presses",
        tracker.total_correct_matches, tracker.total_valid_matches, tracker.total_press_count
    );
    Ok(())
}

fn report(session: &TutorSession, outcome: &Validation, hint: &str) {
    let tracker = session.tracker();
    let verdict = if outcome.is_correct {
        "ok".to_string()
    } else if session.settings().enable_auto_clear {
        format!("miss, {} is {hint}", outcome.target)
    } else {
        let typed = session.scheme().decode(&outcome.keys).join("/");
        let typed = if typed.is_empty() { "nothing" } else { &typed };
        format!("miss, {} typed {typed}; {} is {hint}", outcome.keys, outcome.target)
    };
    println!(
        "{verdict}  acc {:.1}%  {:.0} cpm  {:.2} keys/char",
        percent(tracker.sliding_accuracy()),
        tracker.chars_per_minute(),
        tracker.presses_per_char()
    );
}

fn print_stats(session: &TutorSession, weakest: usize) {
    println!("lesson {}, scheme {}", session.lesson(), session.scheme().name);

    let weak = session.ledger().weakest(weakest, 1);
    if weak.is_empty() {
        println!("no attempts recorded yet");
    } else {
        println!("weakest:");
        for (name, accuracy) in weak {
            println!("  {name:<6} {:>5.1}%", percent(accuracy));
        }
    }

    let metrics = session.achievements().metrics();
    let evaluator = session.evaluator();
    for (metric, value) in &metrics {
        let title = evaluator.evaluate(*metric, *value).unwrap_or("-");
        println!("{:<15} {value:>8.1}  {title}", metric.to_string());
    }
    let earned = evaluator.earned_certifications(&metrics);
    if !earned.is_empty() {
        println!("certifications: {}", earned.join(", "));
    }
}
