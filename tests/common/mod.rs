use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use schoolfinder::storage::{ConversationStore, Message, SledStore};

#[allow(dead_code)]
pub fn create_temp_store() -> (ConversationStore<SledStore>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = open_store_at(store_path(&tmp));
    (store, tmp)
}

#[allow(dead_code)]
pub fn store_path(tmp: &TempDir) -> PathBuf {
    tmp.path().join("store")
}

#[allow(dead_code)]
pub fn open_store_at(path: PathBuf) -> ConversationStore<SledStore> {
    let backend = SledStore::open(path).expect("failed to open sled store");
    ConversationStore::new(backend)
}

#[allow(dead_code)]
pub fn exchange(question: &str, answer: &str) -> Vec<Message> {
    vec![
        Message::assistant("Welcome to SchoolFinder"),
        Message::user(question).as_question(),
        Message::assistant(answer),
    ]
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
