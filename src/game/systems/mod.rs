pub mod defense;
pub mod final_boss;
pub mod interception;
pub mod movement;
