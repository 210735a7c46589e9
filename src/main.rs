//! Command-line driver: train on IDX files, evaluate a saved network, or
//! classify a single image of a handwritten digit.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ferrite_digits::data::image::{load_bilevel_input, render_ascii, BILEVEL_THRESHOLD, MNIST_SIDE};
use ferrite_digits::{evaluate, train_loop, Dataset, NeuralNetwork, Sgd, TrainConfig};

#[derive(Parser)]
#[command(name = "ferrite-digits")]
#[command(about = "Two-layer sigmoid network for handwritten digit recognition", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new network on IDX image/label files
    Train {
        /// IDX3 training images
        #[arg(long)]
        train_images: PathBuf,

        /// IDX1 training labels
        #[arg(long)]
        train_labels: PathBuf,

        /// IDX3 test images, evaluated once training is done
        #[arg(long, requires = "test_labels")]
        test_images: Option<PathBuf>,

        /// IDX1 test labels
        #[arg(long, requires = "test_images")]
        test_labels: Option<PathBuf>,

        /// Hidden layer size
        #[arg(long, default_value = "1000")]
        hidden: usize,

        /// Number of classes (output layer size)
        #[arg(long, default_value = "10")]
        classes: usize,

        /// Full passes over the training set
        #[arg(long, default_value = "20")]
        epochs: usize,

        /// Step size applied to every clamped contribution
        #[arg(long, default_value = "0.1")]
        learning_rate: f64,

        /// Per-contribution clamp limit
        #[arg(long, default_value = "100.0")]
        clamp: f64,

        /// Seed for weight initialization; random when omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Directory receiving a network snapshot after every epoch
        #[arg(long)]
        checkpoint_dir: Option<PathBuf>,

        /// Where to write the trained network
        #[arg(short, long, default_value = "network.json")]
        output: PathBuf,
    },

    /// Count classification errors of a saved network on IDX files
    Evaluate {
        /// Saved network (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// IDX3 images
        #[arg(long)]
        images: PathBuf,

        /// IDX1 labels
        #[arg(long)]
        labels: PathBuf,
    },

    /// Classify one image file (PNG, JPEG, BMP or GIF)
    Predict {
        /// Saved network (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Image of a single digit
        #[arg(short, long)]
        image: PathBuf,

        /// Optionally write the preprocessed bilevel image here (PNG)
        #[arg(long)]
        bilevel_out: Option<PathBuf>,
    },
}

fn parse_level(s: &str) -> Level {
    match s {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            train_images,
            train_labels,
            test_images,
            test_labels,
            hidden,
            classes,
            epochs,
            learning_rate,
            clamp,
            seed,
            checkpoint_dir,
            output,
        } => {
            let train = Dataset::load(&train_images, &train_labels, classes)
                .with_context(|| format!("loading training set {}", train_images.display()))?;
            info!(samples = train.len(), width = train.width, height = train.height, "training set loaded");

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let input_size = train.width * train.height;
            let mut network = NeuralNetwork::new(input_size, classes, hidden, &mut rng)?;
            let optimizer = Sgd::new(learning_rate, clamp)?;

            let mut config = TrainConfig::new(epochs);
            config.checkpoint_dir = checkpoint_dir;

            let history = train_loop(
                &mut network,
                (&train.inputs[..], &train.targets[..]),
                None,
                &optimizer,
                &config,
            )?;
            for s in &history {
                println!(
                    "training iteration {}: {} errors out of {}",
                    s.epoch, s.train_errors, s.train_total
                );
            }

            network
                .save_json(&output)
                .with_context(|| format!("saving network to {}", output.display()))?;
            println!("network saved to {}", output.display());

            if let (Some(images), Some(labels)) = (test_images, test_labels) {
                let test = Dataset::load(&images, &labels, classes)
                    .with_context(|| format!("loading test set {}", images.display()))?;
                let eval = evaluate(&network, &test.inputs, &test.targets)?;
                println!(
                    "testing: {} errors out of {} ({:.2}% accuracy)",
                    eval.errors,
                    eval.total,
                    eval.accuracy() * 100.0
                );
            }
        }

        Commands::Evaluate { model, images, labels } => {
            let network = NeuralNetwork::load_json(&model)
                .with_context(|| format!("loading network {}", model.display()))?;
            let data = Dataset::load(&images, &labels, network.output_size())
                .with_context(|| format!("loading dataset {}", images.display()))?;
            let eval = evaluate(&network, &data.inputs, &data.targets)?;
            println!(
                "{} errors out of {} ({:.2}% accuracy, mean squared error {:.6})",
                eval.errors,
                eval.total,
                eval.accuracy() * 100.0,
                eval.mean_loss
            );
        }

        Commands::Predict { model, image, bilevel_out } => {
            let network = NeuralNetwork::load_json(&model)
                .with_context(|| format!("loading network {}", model.display()))?;
            let (bilevel, input) = load_bilevel_input(&image, MNIST_SIDE, BILEVEL_THRESHOLD)
                .with_context(|| format!("reading image {}", image.display()))?;

            if let Some(path) = bilevel_out {
                bilevel
                    .save(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "wrote bilevel image");
            }

            let confidences = network.predict(&input)?;
            let label = network.classify(&input)?;
            println!("{:?}", confidences);
            print!("{}", render_ascii(&input, MNIST_SIDE as usize));
            println!("{}", label);
        }
    }

    Ok(())
}
