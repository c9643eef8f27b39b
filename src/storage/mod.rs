mod database;
mod memory;
mod todo_repo;

#[cfg(test)]
mod tests;

pub use database::Database;
pub use memory::MemoryTodoStore;
pub use todo_repo::TodoRepo;
