//! Optional CPU profiling helpers (feature-gated).

#[cfg(feature = "profiling")]
mod enabled {
    use anyhow::{anyhow, Result};
    use clap::{Args, ValueEnum};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ProfileFormat {
        Off,
        Flamegraph,
    }

    #[derive(Args, Debug, Clone)]
    pub struct ProfileArgs {
        /// Enable CPU profiling (feature `profiling`).
        ///
        /// Values: off|flamegraph. `--profile` alone defaults to flamegraph.
        #[arg(
            long,
            value_enum,
            default_value_t = ProfileFormat::Off,
            default_missing_value = "flamegraph",
            num_args = 0..=1,
            global = true
        )]
        pub profile: ProfileFormat,

        /// Output path for the flamegraph (`.svg` is added when missing).
        #[arg(long, global = true)]
        pub profile_out: Option<PathBuf>,

        /// Sampling frequency (Hz) for CPU profiling.
        #[arg(long, default_value_t = 99, global = true)]
        pub profile_hz: usize,
    }

    pub struct Profiler {
        guard: pprof::ProfilerGuard<'static>,
        out: PathBuf,
    }

    impl Profiler {
        pub fn start(args: &ProfileArgs) -> Result<Option<Self>> {
            if args.profile == ProfileFormat::Off {
                return Ok(None);
            }

            let hz = i32::try_from(args.profile_hz.max(1)).unwrap_or(i32::MAX);
            let guard = pprof::ProfilerGuard::new(hz)
                .map_err(|e| anyhow!("failed to start profiler: {e}"))?;
            let out = match args.profile_out.clone() {
                Some(path) => path,
                None => default_out(),
            };
            tracing::info!(hz, out = %out.display(), "cpu profiler started");
            Ok(Some(Self { guard, out }))
        }

        pub fn finish(self) -> Result<Vec<PathBuf>> {
            let report = self
                .guard
                .report()
                .build()
                .map_err(|e| anyhow!("failed to build profile report: {e}"))?;

            let path = svg_path(&self.out);
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let mut file = fs::File::create(&path)
                .map_err(|e| anyhow!("failed to create {}: {e}", path.display()))?;
            report
                .flamegraph(&mut file)
                .map_err(|e| anyhow!("failed to write flamegraph: {e}"))?;
            Ok(vec![path])
        }
    }

    fn default_out() -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        PathBuf::from("build/profiles").join(format!("repcount-{ts}.svg"))
    }

    fn svg_path(base: &Path) -> PathBuf {
        if base.extension().is_some() {
            return base.to_path_buf();
        }
        base.with_extension("svg")
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use anyhow::Result;
    use clap::Args;
    use std::path::PathBuf;

    #[derive(Args, Debug, Clone, Default)]
    pub struct ProfileArgs {}

    pub struct Profiler;

    impl Profiler {
        pub fn start(_args: &ProfileArgs) -> Result<Option<Self>> {
            Ok(None)
        }

        pub fn finish(self) -> Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }
}

#[cfg(feature = "profiling")]
pub use enabled::*;
#[cfg(not(feature = "profiling"))]
pub use disabled::*;
