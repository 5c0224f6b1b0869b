pub mod a001_requerimiento;
pub mod a002_historial_requerimiento;
