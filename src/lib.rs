pub mod adherence;
pub mod commands;
pub mod config;
pub mod db;
pub mod food;
pub mod log_store;
pub mod models;
pub mod profile_store;
pub mod targets;
pub mod training;

#[cfg(test)]
mod test_utils;

use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use adherence::ReportWindow;
use commands::nutrition::LogFoodRequest;
use commands::workout::{ExerciseInput, LogWorkoutRequest};
use config::AppConfig;
use db::AppState;
use models::ProfileForm;

#[derive(Parser)]
#[command(
  name = "gymrat",
  about = "Heavy Duty training log",
  long_about = "Log food and workouts, compute nutrition targets from your profile, and report adherence."
)]
struct Cli {
  #[command(subcommand)]
  command: Command,

  /// Data directory override (profile, log database, food database)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Enable debug logging
  #[arg(long, short = 'v', global = true)]
  verbose: bool,
}

#[derive(Subcommand)]
enum Command {
  /// Show or update the stored profile
  Profile {
    #[command(subcommand)]
    action: ProfileCommand,
  },

  /// Nutrition targets for the stored profile, or for the given fields
  Targets(ProfileArgs),

  /// List the food database
  Foods {
    #[arg(long)]
    category: Option<String>,
  },

  /// Log a food from the database
  LogFood {
    food: String,

    /// Grams eaten
    #[arg(long, short = 'q')]
    quantity: f64,

    /// Restrict the lookup to one category
    #[arg(long)]
    category: Option<String>,

    /// Breakfast, Lunch, Dinner, Snack, Pre-Workout, Post-Workout or Other
    #[arg(long)]
    meal: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    time: Option<NaiveTime>,
  },

  /// Log a workout session
  LogWorkout {
    /// Exercise and sets, e.g. "Dumbbell Flyes:8x20@10,6x20@10" (repeatable)
    #[arg(long = "exercise", short = 'e', required = true)]
    exercises: Vec<ExerciseInput>,

    #[arg(long)]
    date: Option<NaiveDate>,

    /// Defaults to the profile's goal
    #[arg(long)]
    goal: Option<String>,

    /// Defaults to the profile's training mode
    #[arg(long)]
    mode: Option<String>,

    /// Session length in minutes
    #[arg(long, default_value = "0")]
    duration: u32,
  },

  /// Suggested parameters and exercises for the profile's goal
  Guide,

  /// Today's intake against the target
  Today {
    #[arg(long)]
    date: Option<NaiveDate>,
  },

  /// Adherence report over a window
  Report {
    /// 7, 30, 90, 365 or all
    #[arg(long, short = 'w', default_value = "7")]
    window: ReportWindow,

    /// Last day of the window (default: today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Plain-text summary instead of JSON
    #[arg(long)]
    text: bool,
  },
}

#[derive(Subcommand)]
enum ProfileCommand {
  Show,
  /// Update the given fields, keeping the rest
  Set(ProfileArgs),
}

#[derive(Args, Default)]
struct ProfileArgs {
  /// Body weight in kg
  #[arg(long)]
  weight: Option<String>,

  /// Height in cm
  #[arg(long)]
  height: Option<String>,

  #[arg(long)]
  age: Option<String>,

  #[arg(long)]
  sex: Option<String>,

  /// Sedentary, Light, Moderate or Very Active
  #[arg(long)]
  activity: Option<String>,

  /// Maintenance, Bulking or Cutting
  #[arg(long)]
  phase: Option<String>,

  /// Beginner, Intermediate or Advanced
  #[arg(long)]
  experience: Option<String>,

  /// Strength, Hypertrophy, Power or Endurance
  #[arg(long)]
  goal: Option<String>,

  /// Heavy Duty or General
  #[arg(long)]
  mode: Option<String>,
}

impl ProfileArgs {
  fn is_empty(&self) -> bool {
    [
      &self.weight,
      &self.height,
      &self.age,
      &self.sex,
      &self.activity,
      &self.phase,
      &self.experience,
      &self.goal,
      &self.mode,
    ]
    .iter()
    .all(|field| field.is_none())
  }
}

impl From<ProfileArgs> for ProfileForm {
  fn from(args: ProfileArgs) -> Self {
    ProfileForm {
      weight: args.weight,
      height: args.height,
      age: args.age,
      sex: args.sex,
      activity_level: args.activity,
      phase: args.phase,
      experience_level: args.experience,
      goal: args.goal,
      mode: args.mode,
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

pub fn run() -> Result<(), Box<dyn Error>> {
  let cli = Cli::parse();

  let mut config = AppConfig::load()?;
  if let Some(dir) = cli.data_dir.clone() {
    config = config.with_data_dir(dir);
  }

  // Logs go to stderr so stdout stays valid JSON
  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();

  debug!(data_dir = %config.data_dir.display(), "Configuration loaded");

  let runtime = tokio::runtime::Runtime::new()?;
  runtime.block_on(async move {
    let state = AppState::open(config).await?;
    let result = dispatch(&state, cli.command).await;
    state.db.close().await;
    result
  })
}

async fn dispatch(state: &AppState, command: Command) -> Result<(), Box<dyn Error>> {
  let today = Local::now().date_naive();

  match command {
    Command::Profile { action } => match action {
      ProfileCommand::Show => print_json(&commands::profile::get_profile(state).await?),
      ProfileCommand::Set(args) => {
        print_json(&commands::profile::update_profile(state, args.into()).await?)
      }
    },
    Command::Targets(args) => {
      if args.is_empty() {
        print_json(&commands::profile::get_targets(state).await?)
      } else {
        let form: ProfileForm = args.into();
        print_json(&commands::profile::preview_targets(state, &form).await?)
      }
    }
    Command::Foods { category } => {
      print_json(&commands::nutrition::list_foods(state, category.as_deref()).await?)
    }
    Command::LogFood {
      food,
      quantity,
      category,
      meal,
      date,
      time,
    } => {
      let request = LogFoodRequest {
        food,
        category,
        quantity_g: quantity,
        meal_type: meal,
        date,
        time,
      };
      print_json(&commands::nutrition::log_food(state, request).await?)
    }
    Command::LogWorkout {
      exercises,
      date,
      goal,
      mode,
      duration,
    } => {
      let request = LogWorkoutRequest {
        exercises,
        date,
        goal,
        mode,
        duration_minutes: duration,
      };
      print_json(&commands::workout::log_workout(state, request).await?)
    }
    Command::Guide => print_json(&commands::workout::get_training_guide(state).await?),
    Command::Today { date } => {
      print_json(&commands::nutrition::get_today(state, date.unwrap_or(today)).await?)
    }
    Command::Report {
      window,
      as_of,
      text,
    } => {
      let report = commands::progress::get_report(state, window, as_of.unwrap_or(today)).await?;
      if text {
        println!("{}", commands::progress::summarize(&report));
        Ok(())
      } else {
        print_json(&report)
      }
    }
  }
}
