pub mod audio_capture;
pub mod audio_record;
pub mod environment;
pub mod publisher;
