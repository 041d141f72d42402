use assessment::{feedback_or_fallback, typing_effect, CoachProvider, MockCoach, TestResult, TestType, UserProfile, SPORTS};
use capture::{
    CaptureControl, CaptureError, CaptureEvent, CaptureFlow, DistanceWarning, FocusPoint,
    SimulatedCamera, SimulatedDevice,
};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use scout::{
    AnalysisEvent, AnalysisRunner, AppConfig, ConfigError, EncryptionAnimation, FileStore, MockResultGenerator,
    Persistence, ScoutApp, TransmissionEvent,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Guided fitness assessments with on-device analysis")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the profile and test history
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available tests
    Tests,
    /// Take a test using the simulated camera
    Run {
        /// Test to take, e.g. "vertical-jump" or "Sit-up Test"
        #[arg(short, long)]
        test: TestType,
        /// Start with the scene too dark
        #[arg(long)]
        low_light: bool,
        /// Start with the phone shaking
        #[arg(long)]
        shake: bool,
        /// Start with the athlete badly positioned
        #[arg(long, value_enum)]
        distance: Option<DistanceArg>,
        /// Seconds until the simulated problems above are fixed
        #[arg(long, default_value = "3")]
        clear_after: u64,
        /// Preview brightness of the simulated cameras (0-255)
        #[arg(long, default_value = "128")]
        brightness: u8,
        /// Flip to the second camera before the test starts
        #[arg(long)]
        switch_camera: bool,
        /// Tap to focus at "x,y" (0.0-1.0 across the preview) once a camera that supports it is ready
        #[arg(long, value_parser = parse_focus)]
        focus: Option<FocusPoint>,
        /// Simulate a manipulated video on the integrity screen
        #[arg(long)]
        deepfake: bool,
        /// Skip the AI coach
        #[arg(long)]
        no_coach: bool,
        /// Seed for the mocked result
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show past results, newest first
    History,
    /// Show or edit the athlete profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Ask the AI coach about a past result
    Coach {
        /// Position in the history, 0 being the most recent
        #[arg(short, long, default_value = "0")]
        index: usize,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Print the current profile
    Show,
    /// Change name and/or sport
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sport: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DistanceArg {
    Close,
    Far,
}

impl From<DistanceArg> for DistanceWarning {
    fn from(arg: DistanceArg) -> Self {
        match arg {
            DistanceArg::Close => DistanceWarning::Close,
            DistanceArg::Far => DistanceWarning::Far,
        }
    }
}

struct RunOptions {
    test: TestType,
    low_light: bool,
    shake: bool,
    distance: Option<DistanceWarning>,
    clear_after: Duration,
    brightness: u8,
    switch_camera: bool,
    focus: Option<FocusPoint>,
    deepfake: bool,
    coach: bool,
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    debug!("Using data directory {}", config.data_dir.display());

    let persistence = Persistence::new(Box::new(FileStore::new(&config.data_dir)));
    let mut app = ScoutApp::new(persistence);

    match cli.command {
        Commands::Tests => list_tests(),
        Commands::Run {
            test,
            low_light,
            shake,
            distance,
            clear_after,
            brightness,
            switch_camera,
            focus,
            deepfake,
            no_coach,
            seed,
        } => {
            let options = RunOptions {
                test,
                low_light,
                shake,
                distance: distance.map(DistanceWarning::from),
                clear_after: Duration::from_secs(clear_after),
                brightness,
                switch_camera,
                focus,
                deepfake,
                coach: !no_coach,
                seed,
            };
            run_test(&mut app, &config, options).await?;
        }
        Commands::History => show_history(&app),
        Commands::Profile { action } => match action {
            ProfileCommand::Show => show_profile(&app),
            ProfileCommand::Set { name, sport } => set_profile(&mut app, name, sport)?,
        },
        Commands::Coach { index } => {
            let Some(record) = app.history().get(index) else {
                println!("No test at position {} in your history.", index);
                return Ok(());
            };
            println!(
                "{} on {}: {}",
                record.test_type(),
                record.date,
                record.result.summary()
            );
            let coach = MockCoach::new(config.coach_config())?;
            print_coaching(&coach, &record.result, config.coach_config().typing_speed).await?;
        }
    }

    Ok(())
}

fn list_tests() {
    println!("Available tests:");
    for test in TestType::ALL {
        println!(
            "  {:<20} {:<22} {:>3}s  {}",
            test.slug(),
            test.display_name(),
            test.recording_duration().as_secs(),
            test.description()
        );
    }
}

fn show_history(app: &ScoutApp) {
    if app.history().is_empty() {
        println!("No tests taken yet.");
        return;
    }
    println!("Test history ({} results):", app.history().len());
    for record in app.history() {
        let feedback = assessment::classify(record.test_type(), &record.result);
        println!(
            "  {:<10} {:<20} {:>10}  {}",
            record.date,
            record.test_type(),
            record.result.summary(),
            feedback.tier
        );
    }
}

fn show_profile(app: &ScoutApp) {
    let profile = app.profile();
    println!("Name:  {}", profile.name);
    println!("Sport: {}", profile.sport);
    println!("Tests: {}", app.history().len());
}

fn set_profile(
    app: &mut ScoutApp,
    name: Option<String>,
    sport: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let current = app.profile().clone();
    let updated = UserProfile::new(
        name.unwrap_or(current.name),
        sport.unwrap_or(current.sport),
    );
    if !updated.has_listed_sport() {
        println!(
            "Note: \"{}\" is not one of {}; saving it as a custom sport.",
            updated.sport,
            SPORTS.join(", ")
        );
    }

    app.open_profile()?;
    app.update_profile(updated)?;
    app.go_home();
    show_profile(app);
    Ok(())
}

async fn run_test(
    app: &mut ScoutApp,
    config: &AppConfig,
    options: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let test = options.test;
    app.select_test(test)?;

    let instructions = test.instructions();
    println!("== {} ==", instructions.title);
    for (i, step) in instructions.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!("{}\n", test.guide_text());

    match capture_video(test, config, &options).await {
        Ok(()) => {}
        Err(CaptureError::Cancelled) => {
            app.go_home();
            println!("\nTest abandoned. Nothing was recorded.");
            return Ok(());
        }
        Err(e) => {
            app.go_home();
            return Err(e.into());
        }
    }
    app.recording_complete()?;

    analyze(test, config).await?;
    let mut generator = match options.seed {
        Some(seed) => MockResultGenerator::seeded(seed),
        None => MockResultGenerator::new(),
    };
    let result = generator.generate(test);
    app.complete_analysis(result)?;

    let metric = result.metric();
    println!("\n== Results ==");
    println!("{}: {} {}", metric.label, metric.value, metric.unit);
    if let Some(feedback) = app.feedback() {
        println!("Performance: {} - {}", feedback.tier, feedback.feedback);
    }

    if options.coach {
        let coach = MockCoach::new(config.coach_config())?;
        print_coaching(&coach, &result, config.coach_config().typing_speed).await?;
    }

    app.show_integrity()?;
    if options.deepfake {
        app.set_deepfake(true)?;
    }
    if let Some(report) = app.integrity_report() {
        println!("\n== Integrity Check ==");
        if let Some(check) = &report.form_check {
            println!("Form: {}", check.message);
        }
        println!(
            "Authenticity [{}]: {}",
            report.authenticity_status(),
            report.authenticity_message()
        );
        if let Some(detail) = report.authenticity_detail() {
            println!("Analysis Detail: {}", detail);
        }
    }

    let packet = app.prepare_transmission(Utc::now())?;
    println!("\n== Data Ready for Transmission ==");
    let mut animation = EncryptionAnimation::new(config.encryption_config())?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    {
        let run = animation.run(tx);
        tokio::pin!(run);
        loop {
            tokio::select! {
                _ = &mut run => break,
                Some(event) = rx.recv() => print_transmission_event(&event),
            }
        }
    }
    while let Ok(event) = rx.try_recv() {
        print_transmission_event(&event);
    }
    println!("{}", packet.to_json()?);

    let record = app.finalize_at(&animation, Local::now())?;
    info!("Saved record {}", record.id);
    println!("\nSaved {} result from {}.", record.test_type(), record.date);
    Ok(())
}

async fn capture_video(
    test: TestType,
    config: &AppConfig,
    options: &RunOptions,
) -> Result<(), CaptureError> {
    let camera = SimulatedCamera::new(vec![
        SimulatedDevice::new("front", "Front Camera").with_brightness(options.brightness),
        SimulatedDevice::new("back", "Back Camera")
            .with_brightness(options.brightness)
            .with_focus(),
    ]);
    let flow = CaptureFlow::new(Box::new(camera), config.capture_config(), test.recording_duration())?;

    let (control_tx, control_rx) = mpsc::channel(16);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut initial = Vec::new();
    if options.low_light {
        initial.push(CaptureControl::SetSimulatedLowLight(true));
    }
    if options.shake {
        initial.push(CaptureControl::SetSimulatedShake(true));
    }
    if let Some(distance) = options.distance {
        initial.push(CaptureControl::SetDistance(distance));
    }
    let blocked = !initial.is_empty();
    if options.switch_camera {
        initial.push(CaptureControl::SwitchCamera);
    }
    for control in initial {
        // The flow has not started yet, so the buffer cannot be full or closed.
        let _ = control_tx.try_send(control);
    }

    let fixer = blocked.then(|| {
        let tx = control_tx.clone();
        let delay = options.clear_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            for control in [
                CaptureControl::SetSimulatedLowLight(false),
                CaptureControl::SetSimulatedShake(false),
                CaptureControl::SetDistance(DistanceWarning::Ok),
            ] {
                if tx.send(control).await.is_err() {
                    break;
                }
            }
        })
    });

    let run = CaptureFlow::run(flow, control_rx, event_tx);
    tokio::pin!(run);
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            Some(event) = event_rx.recv() => {
                print_capture_event(&event);
                if let Some(control) = focus_request(&event, options.focus) {
                    let _ = control_tx.send(control).await;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = control_tx.send(CaptureControl::Cancel).await;
            }
        }
    };
    while let Ok(event) = event_rx.try_recv() {
        print_capture_event(&event);
    }
    if let Some(fixer) = fixer {
        fixer.abort();
    }

    let outcome = outcome?;
    debug!("Captured {:?} on {}", outcome.duration, outcome.device_id);
    Ok(())
}

fn parse_focus(raw: &str) -> Result<FocusPoint, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got \"{}\"", raw))?;
    let coord = |v: &str| -> Result<f64, String> {
        let value: f64 = v
            .trim()
            .parse()
            .map_err(|e| format!("invalid coordinate \"{}\": {}", v.trim(), e))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("coordinate {} is outside 0.0-1.0", value));
        }
        Ok(value)
    };
    Ok(FocusPoint {
        x: coord(x)?,
        y: coord(y)?,
    })
}

/// Focus is requested each time a camera with focus support comes up.
fn focus_request(event: &CaptureEvent, focus: Option<FocusPoint>) -> Option<CaptureControl> {
    match event {
        CaptureEvent::CameraReady {
            supports_focus: true,
            ..
        } => focus.map(CaptureControl::Focus),
        _ => None,
    }
}

fn print_capture_event(event: &CaptureEvent) {
    match event {
        CaptureEvent::DevicesFound(devices) => println!("Found {} camera(s).", devices.len()),
        CaptureEvent::CameraReady { device_id, .. } => println!("Camera ready ({}).", device_id),
        CaptureEvent::Conditions(conditions) => {
            let checklist: Vec<String> = conditions
                .checklist()
                .iter()
                .map(|item| format!("[{}] {}", if item.met { "x" } else { " " }, item.label))
                .collect();
            println!("{}", checklist.join("  "));
            if let Some(warning) = conditions.pose_guide_warning() {
                println!("  {}", warning);
            }
            if let Some(status) = conditions.status_text() {
                println!("  {}", status);
            }
        }
        CaptureEvent::AutoStartArmed | CaptureEvent::AutoStartCancelled => {}
        CaptureEvent::Countdown(n) => println!("{}...", n),
        CaptureEvent::RecordingStarted => println!("Recording"),
        CaptureEvent::Progress(p) => {
            let filled = (p * 20.0).round() as usize;
            print!("\r[{:<20}] {:>3.0}%", "#".repeat(filled), p * 100.0);
            let _ = io::stdout().flush();
        }
        CaptureEvent::RecordingFinished => println!("\nRecording complete."),
        CaptureEvent::FocusApplied(point) => debug!("Focused at {:?}", point),
        CaptureEvent::Error(message) => println!("Camera Error: {}", message),
    }
}

async fn analyze(test: TestType, config: &AppConfig) -> Result<(), ConfigError> {
    println!("\n== Analyzing ==");
    let runner = AnalysisRunner::new(test, config.analysis_timing())?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let run = runner.run(tx);
    tokio::pin!(run);

    loop {
        tokio::select! {
            _ = &mut run => break,
            Some(event) = rx.recv() => print_analysis_event(&event),
        }
    }
    while let Ok(event) = rx.try_recv() {
        print_analysis_event(&event);
    }
    Ok(())
}

fn print_analysis_event(event: &AnalysisEvent) {
    match event {
        AnalysisEvent::Stage {
            stage, progress, ..
        } => {
            print!("[{:>3.0}%] {}", progress * 100.0, stage.message);
            match stage.result {
                Some(figure) => println!("  ({})", figure),
                None => println!(),
            }
        }
        AnalysisEvent::Complete => println!("Analysis complete."),
    }
}

fn print_transmission_event(event: &TransmissionEvent) {
    match event {
        TransmissionEvent::Frame(lines) => {
            if let Some(line) = lines.first() {
                print!("\r{}", line);
                let _ = io::stdout().flush();
            }
        }
        TransmissionEvent::Encrypted => {
            println!("\rPacket Encrypted & Secured. Ready for transmission.");
        }
    }
}

async fn print_coaching(
    coach: &dyn CoachProvider,
    result: &TestResult,
    typing_speed: Duration,
) -> io::Result<()> {
    println!("\n== AI Coach ==");
    println!("Your AI coach is analyzing your performance...");
    let feedback = feedback_or_fallback(coach, result).await;

    let typing = typing_effect(feedback, typing_speed);
    tokio::pin!(typing);
    let mut shown = 0;
    let mut stdout = io::stdout();
    while let Some(prefix) = typing.next().await {
        write!(stdout, "{}", &prefix[shown..])?;
        stdout.flush()?;
        shown = prefix.len();
    }
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_focus() {
        assert_eq!(parse_focus("0.25, 0.8"), Ok(FocusPoint { x: 0.25, y: 0.8 }));
        assert!(parse_focus("0.5").is_err());
        assert!(parse_focus("1.5,0.2").is_err());
        assert!(parse_focus("left,0.2").is_err());
    }

    #[test]
    fn test_focus_only_on_capable_camera() {
        let point = FocusPoint { x: 0.2, y: 0.8 };
        let back = CaptureEvent::CameraReady {
            device_id: "back".into(),
            supports_focus: true,
        };
        let front = CaptureEvent::CameraReady {
            device_id: "front".into(),
            supports_focus: false,
        };

        assert_eq!(focus_request(&back, Some(point)), Some(CaptureControl::Focus(point)));
        assert_eq!(focus_request(&front, Some(point)), None);
        assert_eq!(focus_request(&back, None), None);
        assert_eq!(focus_request(&CaptureEvent::RecordingStarted, Some(point)), None);
    }

    #[test]
    fn test_cli_accepts_focus_flag() {
        let cli = Cli::try_parse_from(["scout", "run", "--test", "broad-jump", "--focus", "0.5,0.5"])
            .unwrap();
        match cli.command {
            Commands::Run { test, focus, .. } => {
                assert_eq!(test, TestType::BroadJump);
                assert_eq!(focus, Some(FocusPoint { x: 0.5, y: 0.5 }));
            }
            _ => panic!("expected the run command"),
        }
    }
}
