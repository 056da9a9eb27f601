pub mod yao_gc;
