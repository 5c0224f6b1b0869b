pub mod a001_requerimiento;
