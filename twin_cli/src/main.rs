use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use twin_core::*;

#[derive(Parser)]
#[command(name = "glucotwin")]
#[command(about = "Diabetic digital twin: forecasts, food checks and dose guidance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override profile file location
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store or display the user profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Dose, forecast and alerts for the stored glucose (default)
    Assess {
        /// Seed the noise source for a reproducible forecast
        #[arg(long)]
        seed: Option<u64>,
    },

    /// 24-hour glucose forecast
    Predict {
        /// Current glucose in mg/dL (defaults to the profile value)
        #[arg(long)]
        glucose: Option<f64>,

        /// Planned carbohydrates in grams
        #[arg(long, default_value_t = 0.0)]
        carbs: f64,

        /// Planned insulin in units
        #[arg(long, default_value_t = 0.0)]
        insulin: f64,

        /// Planned activity (defaults to the profile's habitual level)
        #[arg(long)]
        activity: Option<ActivityLevel>,

        /// Wall-clock hour the forecast starts at (defaults to now)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
        hour: Option<u32>,

        /// Stress on a 0-10 scale
        #[arg(long)]
        stress: Option<f64>,

        /// Hours slept last night
        #[arg(long)]
        sleep: Option<f64>,

        /// Seed the noise source for a reproducible forecast
        #[arg(long)]
        seed: Option<u64>,

        /// Also write the forecast points to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Check whether a food portion is safe right now
    Food {
        /// Food name (substring matches are accepted)
        name: String,

        /// Portion size in grams
        #[arg(long, default_value_t = 100.0)]
        grams: f64,

        /// Current glucose in mg/dL (defaults to the profile value)
        #[arg(long)]
        glucose: Option<f64>,

        /// Insulin on board in units
        #[arg(long, default_value_t = 0.0)]
        iob: f64,
    },

    /// Insulin dose recommendation
    Dose {
        /// Current glucose in mg/dL (defaults to the profile value)
        #[arg(long)]
        glucose: Option<f64>,

        /// Planned carbohydrates in grams
        #[arg(long, default_value_t = 0.0)]
        carbs: f64,

        /// Insulin on board in units
        #[arg(long, default_value_t = 0.0)]
        iob: f64,
    },

    /// Health alerts for a glucose value
    Alerts {
        /// Current glucose in mg/dL (defaults to the profile value)
        #[arg(long)]
        glucose: Option<f64>,

        /// Glucose is rising rapidly
        #[arg(long, conflicts_with = "falling_rapidly")]
        rising_rapidly: bool,

        /// Glucose is falling rapidly
        #[arg(long)]
        falling_rapidly: bool,
    },

    /// Weekly low-GI diet plan
    Plan {
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Simulated real-time sensor reading
    Reading {
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Save a profile
    Set {
        #[arg(long)]
        age: u32,

        /// Weight in kg
        #[arg(long)]
        weight: f64,

        /// Height in cm
        #[arg(long)]
        height: u32,

        /// type1, type2 or prediabetes
        #[arg(long)]
        diabetes_type: DiabetesType,

        /// sedentary, light, moderate, active or athlete
        #[arg(long)]
        activity: ActivityLevel,

        #[arg(long)]
        hba1c: Option<f64>,

        /// Current glucose in mg/dL
        #[arg(long)]
        current_bg: u32,

        /// Typical hours of sleep
        #[arg(long)]
        sleep: Option<f64>,

        /// Typical stress on a 0-10 scale
        #[arg(long)]
        stress: Option<f64>,
    },

    /// Print the stored profile
    Show,
}

/// Everything `assess` computes in one run
#[derive(Serialize)]
struct Assessment<'a> {
    glucose: f64,
    dose: Option<&'a DoseRecommendation>,
    forecast: &'a Forecast,
    alerts: &'a [HealthAlert],
}

fn main() -> Result<()> {
    // Keep stdout clean for command output
    twin_core::logging::init_with_level(twin_core::logging::CLI_LOG_LEVEL)?;

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let profile_file = cli.profile.unwrap_or_else(|| profile_path(&data_dir));
    let ctx = Context {
        config,
        profile_file,
        json: cli.json,
    };

    match cli.command {
        Some(Commands::Profile { action }) => match action {
            ProfileAction::Set {
                age,
                weight,
                height,
                diabetes_type,
                activity,
                hba1c,
                current_bg,
                sleep,
                stress,
            } => cmd_profile_set(
                &ctx,
                UserProfile {
                    age,
                    weight_kg: weight,
                    height_cm: height,
                    diabetes_type,
                    activity,
                    hba1c,
                    current_bg,
                    sleep_hours: sleep,
                    stress_level: stress,
                },
            ),
            ProfileAction::Show => cmd_profile_show(&ctx),
        },
        Some(Commands::Assess { seed }) => cmd_assess(&ctx, seed),
        Some(Commands::Predict {
            glucose,
            carbs,
            insulin,
            activity,
            hour,
            stress,
            sleep,
            seed,
            csv,
        }) => {
            let profile = ctx.require_profile()?;
            let mut input = match hour {
                Some(h) => PredictionInput::at_hour(0.0, h),
                None => PredictionInput::now(0.0),
            };
            input.current_glucose = glucose.unwrap_or(f64::from(profile.current_bg));
            input.planned_carbs = carbs;
            input.planned_insulin = insulin;
            input.planned_activity = activity.unwrap_or(profile.activity);
            input.stress_level = stress.unwrap_or_else(|| ctx.stress_level(&profile));
            input.sleep_hours = sleep.unwrap_or_else(|| ctx.sleep_hours(&profile));
            cmd_predict(&ctx, &profile, &input, seed, csv.as_deref())
        }
        Some(Commands::Food {
            name,
            grams,
            glucose,
            iob,
        }) => cmd_food(&ctx, &name, grams, glucose, iob),
        Some(Commands::Dose { glucose, carbs, iob }) => cmd_dose(&ctx, glucose, carbs, iob),
        Some(Commands::Alerts {
            glucose,
            rising_rapidly,
            falling_rapidly,
        }) => cmd_alerts(
            &ctx,
            glucose,
            TrendFlags {
                is_rising_rapidly: rising_rapidly,
                is_falling_rapidly: falling_rapidly,
            },
        ),
        Some(Commands::Plan { seed }) => cmd_plan(&ctx, seed),
        Some(Commands::Reading { seed }) => cmd_reading(&ctx, seed),
        None => {
            // Default to "assess" command
            cmd_assess(&ctx, None)
        }
    }
}

struct Context {
    config: Config,
    profile_file: PathBuf,
    json: bool,
}

impl Context {
    fn require_profile(&self) -> Result<UserProfile> {
        UserProfile::load(&self.profile_file)?.ok_or_else(|| {
            Error::Profile(format!(
                "No profile found at {}. Run `glucotwin profile set` first.",
                self.profile_file.display()
            ))
        })
    }

    fn stress_level(&self, profile: &UserProfile) -> f64 {
        profile
            .stress_level
            .unwrap_or(self.config.prediction.default_stress_level)
    }

    fn sleep_hours(&self, profile: &UserProfile) -> f64 {
        profile
            .sleep_hours
            .unwrap_or(self.config.prediction.default_sleep_hours)
    }

    fn food_table(&self) -> Result<FoodTable> {
        default_food_table()
            .clone()
            .with_custom(&self.config.foods.custom)
    }
}

fn noise_source(seed: Option<u64>) -> Box<dyn NoiseSource> {
    match seed {
        Some(seed) => Box::new(RandomNoise::seeded(seed)),
        None => Box::new(RandomNoise::from_entropy()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_profile_set(ctx: &Context, profile: UserProfile) -> Result<()> {
    let errors = profile.validate();
    if !errors.is_empty() {
        eprintln!("Profile validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Profile("Invalid profile".into()));
    }

    profile.save(&ctx.profile_file)?;

    if ctx.json {
        return print_json(&profile);
    }
    println!("✓ Profile saved");
    println!("  File: {}", ctx.profile_file.display());
    Ok(())
}

fn cmd_profile_show(ctx: &Context) -> Result<()> {
    let profile = ctx.require_profile()?;
    if ctx.json {
        return print_json(&profile);
    }

    display_header("PROFILE");
    println!("  Age:            {}", profile.age);
    println!("  Weight:         {} kg", profile.weight_kg);
    println!("  Height:         {} cm", profile.height_cm);
    println!("  Diabetes type:  {}", profile.diabetes_type);
    println!("  Activity:       {}", profile.activity);
    if let Some(hba1c) = profile.hba1c {
        println!("  HbA1c:          {}%", hba1c);
    }
    println!("  Current BG:     {} mg/dL", profile.current_bg);
    if let Some(sleep) = profile.sleep_hours {
        println!("  Sleep:          {} h", sleep);
    }
    if let Some(stress) = profile.stress_level {
        println!("  Stress:         {}/10", stress);
    }
    println!();
    Ok(())
}

fn cmd_assess(ctx: &Context, seed: Option<u64>) -> Result<()> {
    let profile = ctx.require_profile()?;
    let glucose = f64::from(profile.current_bg);

    let dose = calculate_insulin_dose(&profile, glucose, 0.0, 0.0);

    let mut input = PredictionInput::now(glucose);
    input.planned_insulin = dose.as_ref().map_or(0.0, |d| d.total_insulin);
    input.planned_activity = profile.activity;
    input.stress_level = ctx.stress_level(&profile);
    input.sleep_hours = ctx.sleep_hours(&profile);

    let mut noise = noise_source(seed);
    let forecast = predict_glucose(&profile, &input, noise.as_mut());
    let alerts = generate_health_alerts(&profile, glucose, None);

    tracing::debug!(
        forecast_id = %forecast.id,
        alerts = alerts.len(),
        "Assessment complete"
    );

    if ctx.json {
        return print_json(&Assessment {
            glucose,
            dose: dose.as_ref(),
            forecast: &forecast,
            alerts: &alerts,
        });
    }

    display_alerts(&alerts);
    match &dose {
        Some(dose) => display_dose(dose),
        None => println!(
            "No insulin dosing rule for {} - dose guidance skipped.\n",
            profile.diabetes_type
        ),
    }
    display_forecast(&forecast);
    Ok(())
}

fn cmd_predict(
    ctx: &Context,
    profile: &UserProfile,
    input: &PredictionInput,
    seed: Option<u64>,
    csv: Option<&Path>,
) -> Result<()> {
    let mut noise = noise_source(seed);
    let forecast = predict_glucose(profile, input, noise.as_mut());

    if let Some(path) = csv {
        let rows = write_forecast_csv(&forecast, path)?;
        if !ctx.json {
            println!("✓ Wrote {} forecast rows to {}", rows, path.display());
        }
    }

    if ctx.json {
        return print_json(&forecast);
    }
    display_forecast(&forecast);
    Ok(())
}

fn cmd_food(
    ctx: &Context,
    name: &str,
    grams: f64,
    glucose: Option<f64>,
    iob: f64,
) -> Result<()> {
    let glucose = match glucose {
        Some(g) => g,
        None => f64::from(ctx.require_profile()?.current_bg),
    };

    let table = ctx.food_table()?;
    let verdict = FoodSafetyAnalyzer::new(&table).analyze(name, grams, glucose, iob);

    if ctx.json {
        return print_json(&verdict);
    }

    display_header(&format!("FOOD CHECK: {}", verdict.safety.to_string().to_uppercase()));
    println!("  {} ({}g)", verdict.food, verdict.quantity_grams);
    println!("  {}", verdict.message);
    if let Some(impact) = &verdict.impact {
        println!();
        println!("  Matched:         {}", impact.matched_food);
        println!("  Net carbs:       {} g", impact.net_carbs);
        println!("  Glycemic index:  {}", impact.glycemic_index);
        println!("  Glycemic load:   {}", impact.glycemic_load);
        println!(
            "  Glucose:         {} → {} mg/dL (+{})",
            glucose, impact.projected_glucose, impact.glucose_impact
        );
    }
    println!("  Confidence:      {:.0}%", verdict.confidence * 100.0);
    if !verdict.recommendations.is_empty() {
        println!();
        for rec in &verdict.recommendations {
            println!("  → {}", rec);
        }
    }
    println!();
    Ok(())
}

fn cmd_dose(ctx: &Context, glucose: Option<f64>, carbs: f64, iob: f64) -> Result<()> {
    let profile = ctx.require_profile()?;
    let glucose = glucose.unwrap_or(f64::from(profile.current_bg));

    let dose = calculate_insulin_dose(&profile, glucose, carbs, iob);

    if ctx.json {
        return print_json(&dose);
    }
    match &dose {
        Some(dose) => display_dose(dose),
        None => println!(
            "No insulin dosing rule for {}. Consult your care team.",
            profile.diabetes_type
        ),
    }
    Ok(())
}

fn cmd_alerts(ctx: &Context, glucose: Option<f64>, trends: TrendFlags) -> Result<()> {
    let profile = ctx.require_profile()?;
    let glucose = glucose.unwrap_or(f64::from(profile.current_bg));

    let alerts = generate_health_alerts(&profile, glucose, Some(&trends));

    if ctx.json {
        return print_json(&alerts);
    }
    if alerts.is_empty() {
        println!("✓ No alerts at {} mg/dL", glucose);
        return Ok(());
    }
    display_alerts(&alerts);
    Ok(())
}

fn cmd_plan(ctx: &Context, seed: Option<u64>) -> Result<()> {
    let profile = ctx.require_profile()?;
    let table = ctx.food_table()?;
    let mut noise = noise_source(seed);

    let Some(plan) = generate_weekly_diet_plan(&table, &profile, noise.as_mut()) else {
        return Err(Error::FoodTable(
            "Not enough low-GI foods to build a plan".into(),
        ));
    };

    if ctx.json {
        return print_json(&plan);
    }

    display_header("WEEKLY DIET PLAN");
    println!("  Daily carb target: {} g", plan.daily_carb_target);
    for day in &plan.days {
        println!();
        println!("  {}", twin_core::diet_plan::day_name(day.day));
        for (label, meal) in [
            ("Breakfast", &day.breakfast),
            ("Lunch", &day.lunch),
            ("Dinner", &day.dinner),
        ] {
            println!(
                "    {:<10} {}, {}, {} + {} ({}g target)",
                label,
                meal.protein,
                meal.carb_source,
                meal.vegetables[0],
                meal.vegetables[1],
                meal.carb_target
            );
        }
        println!(
            "    {:<10} {} ({}g target)",
            "Snacks",
            day.snacks.items.join(", "),
            day.snacks.carb_target
        );
    }
    println!();
    Ok(())
}

fn cmd_reading(ctx: &Context, seed: Option<u64>) -> Result<()> {
    let profile = ctx.require_profile()?;
    let mut noise = noise_source(seed);
    let reading = simulate_real_time_data(&profile, &chrono::Local::now(), noise.as_mut());

    if ctx.json {
        return print_json(&reading);
    }
    println!(
        "{} mg/dL ({}) at {}",
        reading.glucose,
        reading.trend,
        reading.timestamp.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

fn display_header(title: &str) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", title);
    println!("╰─────────────────────────────────────────╯");
    println!();
}

fn display_dose(dose: &DoseRecommendation) {
    display_header("INSULIN DOSE");
    println!("  Total:       {} units", dose.total_insulin);
    println!("  Correction:  {} units", dose.correction_dose);
    println!("  Carbs:       {} units", dose.carb_dose);
    println!("  IOB:         -{} units", dose.iob_adjustment);
    println!("  Timing:      {}", dose.timing);
    println!("  Sensitivity: {}", dose.sensitivity_factor);
    for warning in &dose.warnings {
        let marker = match warning.level {
            WarningLevel::Danger => "✗",
            WarningLevel::Warning => "!",
        };
        println!("  {} {}", marker, warning.message);
    }
    println!();
}

fn display_alerts(alerts: &[HealthAlert]) {
    for alert in alerts {
        let label = match alert.kind {
            AlertKind::Emergency => "EMERGENCY",
            AlertKind::Warning => "WARNING",
        };
        println!("[{}] {}", label, alert.title);
        println!("  {}", alert.message);
        println!("  → {}", alert.action);
        println!();
    }
}

fn display_forecast(forecast: &Forecast) {
    let trends = &forecast.trends;
    display_header("24-HOUR FORECAST");
    println!("  Current:        {} mg/dL", trends.current);
    println!(
        "  Peak:           {} mg/dL (+{}h)",
        trends.peak.value, trends.peak.hour
    );
    println!(
        "  Nadir:          {} mg/dL (+{}h)",
        trends.nadir.value, trends.nadir.hour
    );
    println!(
        "  Trend:          {} short term, {} long term",
        trends.short_term_trend, trends.long_term_trend
    );
    println!("  Time in range:  {}%", trends.time_in_range);
    println!("  Variability:    {}", trends.variability);
    println!("  Confidence:     {:.0}%", forecast.confidence * 100.0);
    println!();

    for point in &forecast.points {
        let clock = (forecast.start_hour + point.hour) % 24;
        println!("  {:02}:00  {:>5.0}", clock, point.glucose);
    }

    if !forecast.risk_zones.is_empty() {
        println!();
        for zone in &forecast.risk_zones {
            println!(
                "  ! {:?} ({:?}) at +{}h",
                zone.kind, zone.severity, zone.hour
            );
        }
    }

    if !forecast.recommendations.is_empty() {
        println!();
        for rec in &forecast.recommendations {
            println!("  → {}: {}", rec.title, rec.message);
        }
    }
    println!();
}
