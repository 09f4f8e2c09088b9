//! A tool that unifies divergent copies of a file into one agreed version,
//! then propagates it back to every place it lived.

pub mod batch;
pub mod config;
pub mod differ;
pub mod error;
pub mod finder;
pub mod fs_port;
pub mod grouper;
pub mod hash;
pub mod line_seq;
pub mod merge_engine;
pub mod orchestrator;
pub mod ports;
pub mod similarity;
pub mod writeback;

pub use batch::{process as run_batch, BatchResult, PatternResult};
pub use config::{BatchConfig, ConfigStore, InputHistory, JsonFileStore, RecentBatch};
pub use differ::{block_context, diff, Block, BlockContext};
pub use error::{BatchError, ConfigError, FsError, HashError, MergeError};
pub use finder::{find, FinderError};
pub use fs_port::{FsPort, RealFs};
pub use grouper::{
    emit_collisions, group, group_by_hash, group_with_status, Collision, FileGroup, GroupOutcome, VersionSet,
};
pub use hash::{hash_bytes, hash_file, FileHash, Hasher};
pub use line_seq::LineSeq;
pub use merge_engine::{merge, merge_whole, BlockChoice, MergeResult, MergeStrategy};
pub use orchestrator::{run_iterative, SessionOutcome};
pub use ports::{
    AlwaysContinuePort, BatchMergePort, BlockChoicePort, ConsoleBlockChoicePort, ConsoleContinuePort,
    ConsoleMergePort, ConsoleStatusPort, ContinuePort, MergePort, NullStatusPort, StatusEvent, StatusPort,
};
pub use similarity::{most_similar_pair, most_similar_to, score, SimilarPair};
pub use writeback::propagate;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
