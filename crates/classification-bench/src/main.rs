use std::io::Write;
use burn_tch::{LibTorch, LibTorchDevice};
use classification_bench::bench;
use classification_bench::classifier::Classifier;
use classification_bench::config::{BenchConfig, DeviceSpec};
use classification_bench::error::BenchError;
use classification_bench::images;
use classification_bench::timers::{TimerKind, Timers};
use log::{info, warn};
use simple_logger::SimpleLogger;

fn main() {
    if let Err(err) = run() {
        bench::fail(&err, &mut std::io::stderr());
        std::process::exit(1);
    }
}

fn run() -> Result<(), BenchError> {
    let config = BenchConfig::from_env()?;
    SimpleLogger::new()
        .with_level(config.log_level)
        .init()
        .map_err(|err| BenchError::Logger(err.to_string()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    bench::header(&config, &mut out)?;

    // Load processing image filenames
    let images = images::list_images(&config.images_dir, config.skip_images, config.images_count())?;
    images::ensure_enough(&images, config.images_count(), &config.images_dir)?;

    let device = select_device(config.device);
    info!("Running on {:?}", device);

    // Build net
    let mut timers = Timers::new();
    timers.start(TimerKind::InitClassifier);
    let classifier: Classifier<LibTorch> = Classifier::new(
        &config.model_file,
        &config.weights_file,
        &config.mean_file(),
        &config.labels_file(),
        config.top_n,
        &device,
    )?;
    timers.stop(TimerKind::InitClassifier);
    bench::initialised(timers.get(TimerKind::InitClassifier), &mut out)?;

    let stats = bench::run(&config, &classifier, &images, &mut timers, &mut out)?;
    bench::report(&stats, &mut out)?;
    out.flush()?;

    if timers.dump_to(config.timer_file.as_deref(), &stats)? {
        info!("Timer state written to {:?}", config.timer_file);
    }

    Ok(())
}

fn select_device(spec: DeviceSpec) -> LibTorchDevice {
    match spec {
        DeviceSpec::Auto if tch::utils::has_cuda() => LibTorchDevice::Cuda(0),
        DeviceSpec::Auto | DeviceSpec::Cpu => LibTorchDevice::Cpu,
        DeviceSpec::Cuda(index) => {
            if !tch::utils::has_cuda() {
                warn!("CUDA device {} requested but no valid CUDA configuration was detected", index);
            }
            LibTorchDevice::Cuda(index)
        }
        DeviceSpec::Mps => LibTorchDevice::Mps,
    }
}
