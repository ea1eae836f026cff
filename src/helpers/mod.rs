pub(crate) mod combine_global;
