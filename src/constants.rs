// === Model Gateway ===
pub const MIN_CALL_INTERVAL_MS: u64 = 2_000;
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_BACKOFF_BASE_MS: u64 = 2_000;   // linear: base * attempt
pub const MODEL_TEMPERATURE: f64 = 0.1;
pub const MODEL_MAX_TOKENS: u32 = 4_000;
pub const HTTP_TIMEOUT_SECS: u64 = 120;

// === Chunking ===
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 800;
pub const CHUNK_NEWLINE_SPLIT_RATIO: f64 = 0.8;  // newline/clause splits need 80% fill
pub const CHUNK_SPACE_SPLIT_RATIO: f64 = 0.9;    // space/tab splits need 90% fill
pub const MIN_CHUNK_LEN: usize = 10;             // shorter chunks are skipped

// === Prompt ===
pub const PROMPT_CHUNK_LIMIT: usize = 2_000;

// === Orchestrator ===
pub const INTER_CHUNK_DELAY_MS: u64 = 1_000;     // politeness delay between chunks

// === Questions ===
pub const MIN_QUESTION_LEN: usize = 5;
pub const MIN_ANSWER_LEN: usize = 1;
pub const DEFAULT_DIFFICULTY: i64 = 3;
pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 5;
pub const FINGERPRINT_PREFIX_CHARS: usize = 100;

// === OCR ===
pub const DEFAULT_OCR_LANGUAGE: &str = "chi_sim+eng";
pub const OCR_CONTRAST_BOOST: f32 = 2.0;
pub const OCR_THRESHOLD: u8 = 128;
pub const OCR_UPSCALE_FACTOR: u32 = 2;
