use log::{error, info};
use probing_buckets::logger::initialize_logger;
use probing_buckets::{HashTable, QuadraticProbe, TableConfig};

fn demo() -> probing_buckets::Result<()> {
    let mut table: HashTable<&str, &str> = HashTable::with_resolver(QuadraticProbe::default());

    table.put("fatimeh", "ef4#B%k")?;
    println!("get after put: {:?}", table.get("fatimeh"));
    table.put("matt", "A9d%&b")?;
    table.put("fadhil", "2h*k9s")?;
    table.put("rumeng", "j8*shX2")?;
    table.put("harper", "m8Ut6%#a")?;
    println!(
        "{} entries in {} slots using {}",
        table.size(),
        table.capacity(),
        table.resolver()
    );

    for (key, value) in &table {
        println!("{} {}", key, value);
    }

    let removed: &str = table.remove("matt")?;
    println!("removed matt ({}), get now returns {:?}", removed, table.get("matt"));
    if let Err(e) = table.remove("matt") {
        println!("second remove: {}", e);
    }
    Ok(())
}

fn bench() -> probing_buckets::Result<()> {
    const CAPACITY: usize = 50000;
    const SAMPLE_SIZE: usize = 100000;

    let samples: Vec<usize> = (0..SAMPLE_SIZE).map(|_| rand::random::<usize>()).collect();
    let config: TableConfig = TableConfig::new().with_capacity(CAPACITY);
    let empty: HashTable<usize, usize> = HashTable::with_config(config)?;

    benchmarking::warm_up();

    match benchmarking::measure_function(|measurer| {
        let mut h: HashTable<usize, usize> = empty.clone();
        measurer.measure(|| {
            for sample in samples.iter() {
                if let Err(e) = h.put(*sample, *sample) {
                    panic!("Failed to put key {}: {}", sample, e);
                }
            }
        });
    }) {
        Ok(result) => println!(
            "Avg time to insert {:?} per key",
            result.elapsed() / SAMPLE_SIZE as u32
        ),
        Err(e) => error!("insert benchmark failed: {:?}", e),
    }

    let mut h: HashTable<usize, usize> = empty;
    for sample in samples.iter() {
        h.put(*sample, *sample)?;
    }
    println!("Initial capacity {} actual capacity {}", CAPACITY, h.capacity());
    println!("Initial entries {} actual entries {}", SAMPLE_SIZE, h.size());
    println!("Load factor {}", h.load_factor());

    match benchmarking::measure_function(|measurer| {
        measurer.measure(|| {
            for sample in samples.iter() {
                match h.get(sample) {
                    Some(_) => (),
                    None => panic!("Failed to get key {}", sample),
                }
            }
        });
    }) {
        Ok(result) => println!(
            "Avg time to lookup {:?} per key",
            result.elapsed() / SAMPLE_SIZE as u32
        ),
        Err(e) => error!("lookup benchmark failed: {:?}", e),
    }

    match benchmarking::measure_function(|measurer| {
        let mut copy: HashTable<usize, usize> = h.clone();
        measurer.measure(|| {
            for sample in samples.iter() {
                // random samples may repeat
                let _ = copy.remove(sample);
            }
        });
    }) {
        Ok(result) => println!(
            "Avg time to delete {:?} per key",
            result.elapsed() / SAMPLE_SIZE as u32
        ),
        Err(e) => error!("delete benchmark failed: {:?}", e),
    }

    Ok(())
}

fn main() {
    initialize_logger();

    if let Err(e) = demo() {
        error!("demo failed: {}", e);
    }

    info!("starting benchmark");
    if let Err(e) = bench() {
        error!("benchmark failed: {}", e);
    }
}
