// ============================================================
// Layer 6 — Device Selection
// ============================================================
// `--gpus 0,1` restricts which CUDA devices the process may see.
// It has to run before any backend initialises a device, so the
// CLI calls it first thing.

const CUDA_DEVICES_VAR: &str = "CUDA_VISIBLE_DEVICES";

/// Export CUDA_VISIBLE_DEVICES when `gpus` is non-empty;
/// an empty value leaves the inherited environment alone.
pub fn select_gpus(gpus: &str) {
    let gpus = gpus.trim();
    if gpus.is_empty() {
        return;
    }
    std::env::set_var(CUDA_DEVICES_VAR, gpus);
    tracing::info!("{}={}", CUDA_DEVICES_VAR, gpus);
}
