pub mod tierlist;
