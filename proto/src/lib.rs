pub mod prekey;
