use crate::engine::EngineError;

/// Largest `k + m` for which every segment index still fits the engine's one byte row identifier.
pub const MAX_TOTAL_SEGMENTS: usize = 255;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionViolation {
	#[error("At least one data segment is required")]
	NoDataSegments,

	#[error("At least one parity segment is required")]
	NoParitySegments,

	#[error("k (= {k}) + m (= {m}) exceeds the max of {max} segments")]
	TooManySegments { k: usize, m: usize, max: usize },

	#[error("Segment size must be non-zero")]
	SegmentSizeIsZero,

	#[error("{count} segments of {segment_size} bytes overflow the addressable size")]
	SegmentSizeOverflow { count: usize, segment_size: usize },

	#[error("Data block has {have} bytes, expected k * segment_size = {want}")]
	DataLengthMismatch { have: usize, want: usize },

	#[error("Recovery needs exactly {want} survivors, have {have}")]
	SurvivorCountMismatch { have: usize, want: usize },

	#[error("Survivor buffer has {have} bytes, expected {want}")]
	SurvivorLengthMismatch { have: usize, want: usize },

	#[error("Segment #{position} has {have} bytes, expected {want}")]
	SegmentLengthMismatch { position: usize, have: usize, want: usize },

	#[error("Survivor index {index} is out of range, must be below {total}")]
	IndexOutOfRange { index: u8, total: usize },

	#[error("Survivor index {index} appears more than once")]
	DuplicateIndex { index: u8 },

	#[error("Payload size is zero")]
	PayloadSizeIsZero,

	#[error("Segment size {want} exceeds the limit of {max} bytes")]
	SegmentTooLarge { want: usize, max: usize },
}

/// Which engine primitive an [`Error::EngineOperation`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	Encode,
	Decode,
}

impl std::fmt::Display for Operation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Encode => f.write_str("encode"),
			Self::Decode => f.write_str("decode"),
		}
	}
}

#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
	#[error("Precondition violated: {0}")]
	Precondition(#[from] PreconditionViolation),

	#[error("Erasure engine failed to initialize")]
	EngineInit(#[source] EngineError),

	#[error("Erasure engine {op} failed for k={k}, m={m}, segment_size={segment_size}")]
	EngineOperation {
		op: Operation,
		k: usize,
		m: usize,
		segment_size: usize,
		#[source]
		source: EngineError,
	},
}

impl Error {
	/// `true` if the call was rejected before reaching the engine.
	pub fn is_precondition_violation(&self) -> bool {
		matches!(self, Self::Precondition(_))
	}
}

pub type Result<T> = std::result::Result<T, Error>;
