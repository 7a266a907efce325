use std::fmt;

use chem_core::model::{Answer, Question};
use storage::sqlite::SqliteRepository;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    fresh: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("CHEM_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut fresh = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--fresh" => {
                    fresh = true;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, fresh })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --fresh                   Clear the question pool before seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  CHEM_DB_URL");
}

fn sample_questions() -> Result<Vec<Question>, Box<dyn std::error::Error>> {
    let raw: &[(&str, &[(&str, bool)], &str, &str)] = &[
        (
            "Which indicator turns pink in a strongly basic solution?",
            &[
                ("Methyl orange", false),
                ("Phenolphthalein", true),
                ("Bromothymol blue", false),
                ("Litmus", false),
            ],
            "Phenolphthalein is colorless below pH 8.3 and pink above it.",
            "acid-base",
        ),
        (
            "What is the pH of a 0.01 M HCl solution?",
            &[("1", false), ("2", true), ("7", false), ("12", false)],
            "HCl dissociates completely, so pH = -log10(0.01) = 2.",
            "acid-base",
        ),
        (
            "At the equivalence point of a strong acid / strong base titration, the pH is:",
            &[
                ("Below 7", false),
                ("Exactly 7", true),
                ("Above 7", false),
                ("Undefined", false),
            ],
            "The salt of a strong acid and strong base does not hydrolyze, leaving a neutral solution.",
            "titration",
        ),
        (
            "In the reaction Zn + Cu2+ -> Zn2+ + Cu, which species is oxidized?",
            &[("Zn", true), ("Cu2+", false), ("Zn2+", false), ("Cu", false)],
            "Zinc loses two electrons, so it is oxidized.",
            "redox",
        ),
        (
            "Which bond type involves a shared pair of electrons?",
            &[
                ("Ionic", false),
                ("Covalent", true),
                ("Metallic", false),
                ("Hydrogen", false),
            ],
            "A covalent bond forms when two atoms share one or more electron pairs.",
            "bonding",
        ),
        (
            "A reaction that releases heat to its surroundings is called:",
            &[
                ("Endothermic", false),
                ("Exothermic", true),
                ("Isothermal", false),
                ("Adiabatic", false),
            ],
            "Exothermic reactions have a negative enthalpy change.",
            "thermochemistry",
        ),
        (
            "How many moles of O2 are needed to burn 2 moles of CH4 completely?",
            &[("1", false), ("2", false), ("4", true), ("8", false)],
            "CH4 + 2 O2 -> CO2 + 2 H2O, so 2 moles of CH4 need 4 moles of O2.",
            "stoichiometry",
        ),
        (
            "Which salt solution is acidic?",
            &[
                ("NaCl", false),
                ("NH4Cl", true),
                ("CH3COONa", false),
                ("KNO3", false),
            ],
            "The ammonium ion hydrolyzes, donating a proton to water.",
            "acid-base",
        ),
        (
            "The oxidation number of Mn in KMnO4 is:",
            &[("+2", false), ("+4", false), ("+7", true), ("-1", false)],
            "K is +1 and each O is -2, so Mn must be +7 for a neutral compound.",
            "redox",
        ),
        (
            "Burning 1 mol of methane releases 890 kJ. How much heat comes from 0.5 mol?",
            &[
                ("222.5 kJ", false),
                ("445 kJ", true),
                ("890 kJ", false),
                ("1780 kJ", false),
            ],
            "Enthalpy scales linearly with amount: 890 kJ/mol x 0.5 mol = 445 kJ.",
            "thermochemistry",
        ),
    ];

    let mut questions = Vec::with_capacity(raw.len());
    for (prompt, answers, explanation, category) in raw {
        let answers = answers
            .iter()
            .map(|(text, correct)| Answer::new(*text, *correct))
            .collect();
        questions.push(Question::new(*prompt, answers, *explanation, *category)?);
    }
    Ok(questions)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let repo = SqliteRepository::connect(&args.db_url).await?;
    repo.migrate().await?;

    if args.fresh {
        sqlx::query("DELETE FROM questions")
            .execute(repo.pool())
            .await?;
    }

    let questions = sample_questions()?;
    let count = questions.len();
    for question in &questions {
        repo.insert_question(question).await?;
    }

    println!("Seeded {count} questions into {}", args.db_url);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
