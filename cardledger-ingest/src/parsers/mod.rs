pub mod apple_card;
