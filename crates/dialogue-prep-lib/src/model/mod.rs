pub mod dialogue_record;
pub mod prompt_example;
