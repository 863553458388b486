use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick an index with probability proportional to `weights`.
    fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut target = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if target < *w {
                return i;
            }
            target -= w;
        }
        weights.len() - 1
    }
}

enum Kind {
    Single(&'static [(&'static str, f64)]),
    /// Options with independent selection probabilities.
    Multiple(&'static [(&'static str, f64)]),
    Text(&'static [&'static str]),
}

struct SampleQuestion {
    column: &'static str,
    text: &'static str,
    kind: Kind,
    /// Probability that a respondent skips the question.
    skip: f64,
}

const QUESTIONS: &[SampleQuestion] = &[
    SampleQuestion {
        column: "MainBranch",
        text: "Which of the following options best describes you today?",
        kind: Kind::Single(&[
            ("I am a developer by profession", 0.7),
            ("I am learning to code", 0.15),
            ("I code primarily as a hobby", 0.1),
            ("I used to be a developer by profession, but no longer am", 0.05),
        ]),
        skip: 0.0,
    },
    SampleQuestion {
        column: "Age",
        text: "What is your age?",
        kind: Kind::Single(&[
            ("18-24 years old", 0.2),
            ("25-34 years old", 0.4),
            ("35-44 years old", 0.25),
            ("45-54 years old", 0.1),
            ("55-64 years old", 0.05),
        ]),
        skip: 0.02,
    },
    SampleQuestion {
        column: "RemoteWork",
        text: "Which best describes your current work situation?",
        kind: Kind::Single(&[
            ("Remote", 0.4),
            ("Hybrid (some remote, some in-person)", 0.45),
            ("In-person", 0.15),
        ]),
        skip: 0.15,
    },
    SampleQuestion {
        column: "LanguageHaveWorkedWith",
        text: "Which programming, scripting, and markup languages have you done extensive development work in over the past year?",
        kind: Kind::Multiple(&[
            ("JavaScript", 0.6),
            ("Python", 0.5),
            ("SQL", 0.5),
            ("TypeScript", 0.4),
            ("Java", 0.3),
            ("C#", 0.25),
            ("Go", 0.15),
            ("Rust", 0.12),
        ]),
        skip: 0.05,
    },
    SampleQuestion {
        column: "DatabaseHaveWorkedWith",
        text: "Which database environments have you done extensive development work in over the past year?",
        kind: Kind::Multiple(&[
            ("PostgreSQL", 0.45),
            ("MySQL", 0.35),
            ("SQLite", 0.3),
            ("Redis", 0.2),
            ("MongoDB", 0.2),
        ]),
        skip: 0.2,
    },
    SampleQuestion {
        column: "AISelect",
        text: "Do you currently use AI tools in your development process?",
        kind: Kind::Single(&[
            ("Yes", 0.6),
            ("No, but I plan to soon", 0.25),
            ("No, and I don't plan to", 0.15),
        ]),
        skip: 0.05,
    },
    SampleQuestion {
        column: "SurveyLength",
        text: "How do you feel about the length of the survey this year?",
        kind: Kind::Text(&["Appropriate in length", "Too long", "Too short"]),
        skip: 0.3,
    },
];

fn answer(question: &SampleQuestion, rng: &mut SimpleRng) -> Option<String> {
    if rng.chance(question.skip) {
        return None;
    }
    match &question.kind {
        Kind::Single(options) => {
            let weights: Vec<f64> = options.iter().map(|(_, w)| *w).collect();
            Some(options[rng.weighted(&weights)].0.to_string())
        }
        Kind::Multiple(options) => {
            let picked: Vec<&str> = options
                .iter()
                .filter(|(_, p)| rng.chance(*p))
                .map(|(name, _)| *name)
                .collect();
            if picked.is_empty() {
                None
            } else {
                Some(picked.join(";"))
            }
        }
        Kind::Text(answers) => Some(answers[rng.next_u64() as usize % answers.len()].to_string()),
    }
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| ".".to_string()));
    let respondents: usize = std::env::args()
        .nth(2)
        .map(|n| n.parse())
        .transpose()
        .context("respondent count must be a number")?
        .unwrap_or(500);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // Column-major answers; None = skipped.
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(respondents); QUESTIONS.len()];
    for _ in 0..respondents {
        for (q, column) in QUESTIONS.iter().zip(columns.iter_mut()) {
            column.push(answer(q, &mut rng));
        }
    }

    // Schema
    let schema_path = out_dir.join("schema.csv");
    let mut schema_writer = csv::Writer::from_path(&schema_path).context("creating schema.csv")?;
    schema_writer.write_record(["column", "question_text", "type"])?;
    for q in QUESTIONS {
        let tag = match q.kind {
            Kind::Single(_) => "SC",
            Kind::Multiple(_) => "MC",
            Kind::Text(_) => "TE",
        };
        schema_writer.write_record([q.column, q.text, tag])?;
    }
    schema_writer.flush()?;

    // Responses as CSV; skipped answers are written as the NA marker.
    let csv_path = out_dir.join("responses.csv");
    let mut csv_writer = csv::Writer::from_path(&csv_path).context("creating responses.csv")?;
    csv_writer.write_record(QUESTIONS.iter().map(|q| q.column))?;
    for row in 0..respondents {
        csv_writer.write_record(columns.iter().map(|c| c[row].as_deref().unwrap_or("NA")))?;
    }
    csv_writer.flush()?;

    // Responses as Parquet; skipped answers are nulls.
    let arrow_schema = Arc::new(Schema::new(
        QUESTIONS
            .iter()
            .map(|q| Field::new(q.column, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|c| Arc::new(StringArray::from(c.clone())) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(arrow_schema.clone(), arrays)
        .context("building record batch")?;

    let parquet_path = out_dir.join("responses.parquet");
    let file = std::fs::File::create(&parquet_path).context("creating responses.parquet")?;
    let mut writer = ArrowWriter::try_new(file, arrow_schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} questions and {respondents} respondents to {}",
        QUESTIONS.len(),
        out_dir.display()
    );
    Ok(())
}
