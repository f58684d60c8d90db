pub mod gist;
