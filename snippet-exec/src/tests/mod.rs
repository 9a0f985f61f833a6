mod java;
mod utils;
