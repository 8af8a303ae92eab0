//! Authored data: clues, dialogue nodes, graphs and characters.

pub mod character;
pub mod clue;
pub mod graph;
pub mod node;
