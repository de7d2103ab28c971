pub mod provider {
    pub mod movie_proxy_provider {
        include!(concat!(env!("OUT_DIR"), "/mapper/provider/movie_proxy_provider.rs"));
    }
}

pub mod movie_proxy_mapper {
    include!(concat!(env!("OUT_DIR"), "/mapper/movie_proxy_mapper.rs"));
}
