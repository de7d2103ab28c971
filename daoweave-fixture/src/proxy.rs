pub mod movie_proxy_impl {
    include!(concat!(env!("OUT_DIR"), "/proxy/movie_proxy_impl.rs"));
}
