//! Measurement thread setup.
//!
//! Migrating between cores mid-sweep swaps out the caches being measured, and preemption
//! shows up as outliers. Neither failure is fatal: the trimmed mean absorbs some noise, so
//! the run continues with a warning.
use log::{info, warn};

/// Pin the calling thread to `cpu_core` (if given) and raise it to maximum priority.
///
/// Returns whether the thread ended up pinned.
pub fn prepare_measurement_thread(cpu_core: Option<usize>) -> bool {
    let pinned = match cpu_core {
        Some(cpu_num) => {
            let core_num = core_affinity::CoreId { id: cpu_num };
            if core_affinity::set_for_current(core_num) {
                info!("Measurement thread pinned to CPU core {}", cpu_num);
                true
            } else {
                warn!(
                    "Couldn't pin measurement thread to CPU core {} (NOTE: this is expected on macOS)",
                    cpu_num
                );
                false
            }
        }
        None => false,
    };

    if thread_priority::set_current_thread_priority(thread_priority::ThreadPriority::Max).is_err() {
        warn!("Couldn't set measurement thread to maximum thread priority");
    }

    pinned
}
