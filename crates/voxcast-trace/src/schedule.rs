//! Chunked, round-based traversal driver.
//!
//! Rays are split into chunks of at most `max_chunk_size`. Each outer round
//! launches one [`ChunkKernel`] per chunk that still has active rays; a launch
//! gives every active ray up to `max_inner_steps` Stepper calls. Cursors live
//! in [`TraversalState`] between launches, so splitting the same budget into
//! more rounds (or other chunk sizes) yields identical states.

use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use voxcast_blocks::OccupancyTable;
use voxcast_grid::{BlockGrid, OccupancyMask};

use crate::finalize::{OutcomeCounts, TraceOutput, finalize, write_hits};
use crate::state::TraversalState;
use crate::{Ray, RayBatch, TraceConfig, TraceError};

/// One launch worth of work: read-only views plus the per-ray step budget.
pub struct ChunkKernel<'a> {
    rays: &'a [Ray],
    mask: &'a OccupancyMask,
    max_inner_steps: u32,
    min_rays_per_task: usize,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchStats {
    /// Stepper calls made during the launch.
    pub steps: u64,
    /// Rays still `Normal` afterwards.
    pub active: usize,
}

impl<'a> ChunkKernel<'a> {
    pub fn new(
        rays: &'a [Ray],
        mask: &'a OccupancyMask,
        max_inner_steps: u32,
        min_rays_per_task: usize,
    ) -> Self {
        Self {
            rays,
            mask,
            max_inner_steps,
            min_rays_per_task: min_rays_per_task.max(1),
        }
    }

    /// Advances every active ray of the chunk; `states[i]` belongs to `rays[i]`.
    pub fn launch(&self, states: &mut [TraversalState]) -> LaunchStats {
        debug_assert_eq!(states.len(), self.rays.len());
        states
            .par_iter_mut()
            .zip(self.rays.par_iter())
            .with_min_len(self.min_rays_per_task)
            .map(|(state, ray)| {
                if !state.is_active() {
                    return LaunchStats::default();
                }
                let steps = u64::from(state.advance(ray, self.mask, self.max_inner_steps));
                LaunchStats {
                    steps,
                    active: state.is_active() as usize,
                }
            })
            .reduce(LaunchStats::default, |a, b| LaunchStats {
                steps: a.steps + b.steps,
                active: a.active + b.active,
            })
    }
}

/// Owns the trace thread pool and drives rounds of chunk launches.
pub struct Scheduler {
    config: TraceConfig,
    pool: ThreadPool,
}

impl Scheduler {
    pub fn new(config: TraceConfig) -> Result<Self, TraceError> {
        config.validate()?;
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("voxcast-trace-{i}"));
        if let Some(n) = config.threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| TraceError::ThreadPool(e.to_string()))?;
        Ok(Self { config, pool })
    }

    #[inline]
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Runs `op` on the trace pool, so nested rayon work is bounded by
    /// `threads`.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Fresh cursors, one per ray, at the floor of each origin.
    pub fn init_states(&self, rays: &RayBatch) -> Vec<TraversalState> {
        self.pool
            .install(|| rays.as_slice().par_iter().map(TraversalState::new).collect())
    }

    /// [`OccupancyMask::build`] on the trace pool.
    pub fn build_mask(
        &self,
        grid: &BlockGrid,
        table: &OccupancyTable,
    ) -> Result<OccupancyMask, TraceError> {
        Ok(self.pool.install(|| OccupancyMask::build(grid, table))?)
    }

    /// Full traversal: init, up to `max_outer_rounds` rounds, finalize.
    pub fn traverse(
        &self,
        rays: &RayBatch,
        grid: &BlockGrid,
        mask: &OccupancyMask,
    ) -> Result<TraceOutput, TraceError> {
        check_mask(grid, mask)?;
        let t0 = Instant::now();
        let mut states = self.init_states(rays);
        let rounds = self.run_rounds(rays, mask, &mut states, self.config.max_outer_rounds)?;
        let results = self.pool.install(|| finalize(&states, grid));
        let counts = OutcomeCounts::from_states(&states);
        log::info!(
            target: "trace",
            "traversed {} rays in {} round(s): {} hit, {} escaped, {} unresolved ({:.1}ms)",
            rays.len(),
            rounds,
            counts.hit,
            counts.escaped,
            counts.unresolved,
            t0.elapsed().as_secs_f64() * 1000.0
        );
        if counts.unresolved > 0 {
            log::warn!(
                target: "trace",
                "{} ray(s) exhausted the {}-step budget",
                counts.unresolved,
                self.config.step_budget()
            );
        }
        Ok(TraceOutput {
            results,
            states,
            counts,
            rounds,
        })
    }

    /// Traverses into caller-owned flat buffers. Only hit entries are written.
    pub fn traverse_into(
        &self,
        rays: &RayBatch,
        grid: &BlockGrid,
        mask: &OccupancyMask,
        codes: &mut [u32],
        depths: &mut [f64],
    ) -> Result<OutcomeCounts, TraceError> {
        check_mask(grid, mask)?;
        check_len("result", rays.len(), codes.len())?;
        check_len("result_depth", rays.len(), depths.len())?;
        let mut states = self.init_states(rays);
        self.run_rounds(rays, mask, &mut states, self.config.max_outer_rounds)?;
        self.pool.install(|| write_hits(&states, grid, codes, depths));
        Ok(OutcomeCounts::from_states(&states))
    }

    /// Runs up to `rounds` outer rounds over existing cursors and returns how
    /// many were launched. Stops early once no ray is active.
    pub fn run_rounds(
        &self,
        rays: &RayBatch,
        mask: &OccupancyMask,
        states: &mut [TraversalState],
        rounds: u32,
    ) -> Result<u32, TraceError> {
        check_len("traversal state", rays.len(), states.len())?;
        let chunk = self.config.max_chunk_size;
        let mut chunk_active: Vec<bool> = states
            .chunks(chunk)
            .map(|c| c.iter().any(TraversalState::is_active))
            .collect();
        let mut launched = 0;
        for round in 0..rounds {
            if !chunk_active.iter().any(|a| *a) {
                break;
            }
            let t0 = Instant::now();
            let mut round_steps = 0u64;
            let mut active = 0usize;
            for ((chunk_states, chunk_rays), flag) in states
                .chunks_mut(chunk)
                .zip(rays.as_slice().chunks(chunk))
                .zip(chunk_active.iter_mut())
            {
                if !*flag {
                    continue;
                }
                let kernel = ChunkKernel::new(
                    chunk_rays,
                    mask,
                    self.config.max_inner_steps,
                    self.config.min_rays_per_task,
                );
                let stats = self.pool.install(|| kernel.launch(chunk_states));
                round_steps += stats.steps;
                active += stats.active;
                *flag = stats.active > 0;
            }
            launched += 1;
            log::debug!(
                target: "trace",
                "round {}: {} steps, {} active, {:.2}ms",
                round,
                round_steps,
                active,
                t0.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(launched)
    }
}

fn check_mask(grid: &BlockGrid, mask: &OccupancyMask) -> Result<(), TraceError> {
    if grid.extents() != mask.extents() {
        return Err(TraceError::MaskShape {
            grid: grid.extents(),
            mask: mask.extents(),
        });
    }
    Ok(())
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), TraceError> {
    if expected != actual {
        return Err(TraceError::OutputLength {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
