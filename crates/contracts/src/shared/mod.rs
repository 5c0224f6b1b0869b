pub mod mensaje;
