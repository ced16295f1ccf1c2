pub mod buffer_sizer;
pub mod transfer_buffer;
