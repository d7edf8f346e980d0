pub mod ranking_writer;

pub use ranking_writer::RankingWriter;
