// src/repositories/postgres/mod.rs

pub mod wardrobe_item;

pub use wardrobe_item::WardrobeItemRepository;
