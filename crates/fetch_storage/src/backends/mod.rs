pub mod memory;
pub mod supabase;

pub use memory::MemoryStorage;
pub use supabase::SupabaseStorage;
